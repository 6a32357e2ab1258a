//! Build: `build(template, values)`
//!
//! The inverse of `parse`: walks the template copying literal text and
//! replacing each `{name}` with the canonical string form of
//! `values[name]`. Missing keys (and container values, which have no
//! canonical text) substitute as empty. Produces a string value.

use super::{store_result, string_arg};
use crate::expression_evaluator::evaluate as evaluate_expression;
use crate::frame::Frame;
use agerun_core::{ErrorKind, Map, RuntimeError, Value};
use agerun_lang::ast::{ExpressionAst, MemoryPath};

pub(crate) fn evaluate(
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let template = string_arg(frame, &args[0], "build template")?;
    let built = {
        let evaluated = evaluate_expression(frame, &args[1])?;
        let values = evaluated.as_value().as_map().ok_or_else(|| {
            RuntimeError::new(
                ErrorKind::TypeMismatch,
                format!(
                    "build values must be a map, got {}",
                    evaluated.as_value().type_name()
                ),
            )
        })?;
        substitute(&template, values)
    };
    store_result(frame, result_path, Value::String(built))
}

fn substitute(template: &str, values: &Map) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open + 1..].find('}') else {
            // Unclosed brace: the remainder is literal.
            break;
        };
        out.push_str(&rest[..open]);
        let name = &rest[open + 1..open + 1 + close];
        if let Some(text) = values.get(name).and_then(Value::canonical_string) {
            out.push_str(&text);
        }
        rest = &rest[open + 1 + close + 1..];
    }
    out.push_str(rest);
    out
}
