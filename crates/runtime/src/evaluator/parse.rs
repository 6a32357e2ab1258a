//! Parse: `parse(template, input)`
//!
//! Extracts `{name}` placeholders from a template by walking template and
//! input in lockstep. Literal template text must match the input exactly;
//! each placeholder captures up to the next literal segment (or the rest
//! of the input when none follows). Captures are type-inferred: all
//! digits make an integer, a numeric string containing `.` makes a
//! double, anything else stays a string. A mismatch anywhere yields an
//! empty map, not a failure.
//!
//! `{ident}` is the only placeholder form; there is no escape for a
//! literal `{`.

use super::{store_result, string_arg};
use crate::frame::Frame;
use agerun_core::{Map, RuntimeError, Value};
use agerun_lang::ast::{ExpressionAst, MemoryPath};

pub(crate) fn evaluate(
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let template = string_arg(frame, &args[0], "parse template")?;
    let input = string_arg(frame, &args[1], "parse input")?;
    let extracted = match_template(&template, &input).unwrap_or_default();
    store_result(frame, result_path, Value::Map(extracted))
}

/// Walk template and input together; `None` means mismatch.
fn match_template(template: &str, input: &str) -> Option<Map> {
    let mut result = Map::new();
    let mut template = template;
    let mut input = input;

    loop {
        let Some((literal, name, rest)) = next_placeholder(template) else {
            // No placeholder left: the remaining template is pure literal.
            return (template == input).then_some(result);
        };

        input = input.strip_prefix(literal)?;
        template = rest;

        // The placeholder captures up to the next literal segment.
        let delimiter = match next_placeholder(template) {
            Some((next_literal, _, _)) => next_literal,
            None => template,
        };

        let captured = if delimiter.is_empty() {
            // Placeholder at the end (or adjacent placeholders): take the
            // rest of the input.
            let all = input;
            input = "";
            all
        } else {
            let at = input.find(delimiter)?;
            let (captured, remaining) = input.split_at(at);
            input = remaining;
            captured
        };
        result.insert(name.to_string(), infer_value(captured));
    }
}

/// Split a template at its first placeholder: `(literal, name, rest)`.
/// A `{` with no closing `}` is treated as literal text.
fn next_placeholder(template: &str) -> Option<(&str, &str, &str)> {
    let open = template.find('{')?;
    let close = template[open + 1..].find('}')?;
    let literal = &template[..open];
    let name = &template[open + 1..open + 1 + close];
    let rest = &template[open + 1 + close + 1..];
    Some((literal, name, rest))
}

fn infer_value(text: &str) -> Value {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = text.parse::<i64>() {
            return Value::Integer(n);
        }
    }
    if text.contains('.') {
        if let Ok(d) = text.parse::<f64>() {
            return Value::Double(d);
        }
    }
    Value::String(text.to_string())
}
