//! Line-oriented parser for method source
//!
//! Each non-blank line, after comment stripping, is exactly one
//! instruction:
//!
//! ```text
//! memory.path := expr
//! [memory.path :=] fn(arg, ...)
//! ```
//!
//! `#` starts a comment running to end of line (quote-aware, so a `#`
//! inside a string literal is preserved). Parse failures are recorded on
//! the log with their 1-based line number and yield no method AST at all -
//! a method whose source fails to parse is still registrable, but cannot
//! execute.

use crate::ast::{FunctionKind, InstructionAst, MemoryPath, MethodAst};
use crate::expression_parser::parse_expression;
use agerun_core::{ErrorKind, Log, RuntimeError};

/// Parse a whole method body. On the first bad line, records the error
/// (with its line number) and returns `None`.
pub fn parse_method_source(source: &str, log: &Log) -> Option<MethodAst> {
    let mut instructions = Vec::new();
    for (index, raw_line) in source.lines().enumerate() {
        let line = strip_comment(raw_line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_instruction(line) {
            Ok(instruction) => instructions.push(instruction),
            Err(err) => {
                log.report(err.with_line(index as u32 + 1));
                return None;
            }
        }
    }
    Some(MethodAst::new(instructions))
}

/// Parse one instruction line (already comment-stripped and trimmed).
pub fn parse_instruction(line: &str) -> Result<InstructionAst, RuntimeError> {
    if let Some(op_index) = find_assign_op(line) {
        let target = line[..op_index].trim();
        let rest = line[op_index + 2..].trim();
        let path = parse_assignment_target(target)?;
        if rest.is_empty() {
            return Err(parse_error("missing right-hand side after ':='"));
        }
        if let Some((name, args_src)) = match_call_shape(rest) {
            return parse_function_call(name, args_src, Some(path));
        }
        let expr = parse_expression(rest)?;
        return Ok(InstructionAst::Assignment {
            path,
            expr_text: rest.to_string(),
            expr,
        });
    }

    match match_call_shape(line) {
        Some((name, args_src)) => parse_function_call(name, args_src, None),
        None => Err(parse_error(format!(
            "expected an assignment or a function call, got '{}'",
            line
        ))),
    }
}

fn parse_error(message: impl Into<String>) -> RuntimeError {
    RuntimeError::new(ErrorKind::Parse, message)
}

/// Cut a `#` comment, honoring double-quoted strings and their escapes.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Locate a top-level `:=` (outside strings and parentheses).
fn find_assign_op(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth = 0usize;
    for i in 0..bytes.len() {
        let c = bytes[i];
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'(' if !in_string => depth += 1,
            b')' if !in_string => depth = depth.saturating_sub(1),
            b':' if !in_string && depth == 0 && bytes.get(i + 1) == Some(&b'=') => {
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Validate an assignment target: a dotted path rooted at `memory`.
fn parse_assignment_target(target: &str) -> Result<MemoryPath, RuntimeError> {
    let mut parts = target.split('.');
    let root = parts.next().unwrap_or("");
    let segments: Vec<String> = parts.map(str::to_string).collect();

    if !is_identifier(root) || !segments.iter().all(|s| is_identifier(s)) {
        return Err(parse_error(format!(
            "invalid assignment target '{}'",
            target
        )));
    }
    match root {
        "memory" if segments.is_empty() => {
            Err(parse_error("cannot assign to the memory root itself"))
        }
        "memory" => Ok(MemoryPath::new(segments)),
        "context" | "message" => Err(RuntimeError::new(
            ErrorKind::AssignTargetForbidden,
            format!("cannot assign to '{}'", target),
        )),
        other => Err(parse_error(format!(
            "assignment target must start with 'memory.', got '{}'",
            other
        ))),
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Recognize `ident ( ... )` spanning the whole text; returns the name and
/// the raw argument text between the outer parentheses.
fn match_call_shape(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let name = text[..open].trim_end();
    if !is_identifier(name) || name.contains('.') {
        return None;
    }
    if !text.ends_with(')') {
        return None;
    }
    Some((name, &text[open + 1..text.len() - 1]))
}

fn parse_function_call(
    name: &str,
    args_src: &str,
    result_path: Option<MemoryPath>,
) -> Result<InstructionAst, RuntimeError> {
    let kind = FunctionKind::from_name(name)
        .ok_or_else(|| parse_error(format!("unknown function '{}'", name)))?;

    let args_text = split_top_level_args(args_src)?;
    if args_text.len() != kind.arity() {
        return Err(parse_error(format!(
            "{} expects {} arguments, got {}",
            kind.name(),
            kind.arity(),
            args_text.len()
        )));
    }

    let mut args = Vec::with_capacity(args_text.len());
    for arg in &args_text {
        args.push(parse_expression(arg)?);
    }

    Ok(InstructionAst::FunctionCall {
        kind,
        args_text,
        args,
        result_path,
    })
}

/// Split an argument list on commas at parenthesis depth 0, respecting
/// double-quoted strings. Rejects unbalanced parentheses and unclosed
/// strings.
fn split_top_level_args(text: &str) -> Result<Vec<String>, RuntimeError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_string = !in_string;
            }
            '(' if !in_string => {
                current.push(c);
                depth += 1;
            }
            ')' if !in_string => {
                if depth == 0 {
                    return Err(parse_error("unbalanced ')' in argument list"));
                }
                current.push(c);
                depth -= 1;
            }
            ',' if !in_string && depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_string {
        return Err(parse_error("unclosed string in argument list"));
    }
    if depth != 0 {
        return Err(parse_error("unbalanced '(' in argument list"));
    }

    let last = current.trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last.to_string());
    }
    if args.iter().any(|a| a.is_empty()) {
        return Err(parse_error("empty argument"));
    }
    Ok(args)
}
