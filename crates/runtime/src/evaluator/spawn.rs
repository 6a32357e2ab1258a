//! Spawn: `spawn(method_name, version, context)`
//!
//! Resolves the method through the version resolver, allocates an id, and
//! registers the new agent. The context argument must be a map: the bare
//! `context` accessor shares the current agent's context handle with the
//! child; any other borrowed container cannot be shared (no deep copy)
//! and fails gracefully.
//!
//! The allocated id (or 0 on failure) is stored to the result path.

use super::{store_result, string_arg};
use crate::agency::Agency;
use crate::expression_evaluator::evaluate as evaluate_expression;
use crate::frame::Frame;
use agerun_core::{ErrorKind, Evaluated, RuntimeError, Value};
use agerun_lang::ast::{ExpressionAst, MemoryPath};
use std::rc::Rc;

pub(crate) fn evaluate(
    agency: &mut Agency,
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let name = string_arg(frame, &args[0], "spawn method name")?;
    let version = string_arg(frame, &args[1], "spawn version")?;
    let context = spawn_context(frame, &args[2])?;

    let id = agency.create_agent(&name, Some(version.as_str()), Some(context));
    store_result(frame, result_path, Value::Integer(id))?;
    if id == 0 {
        return Err(RuntimeError::new(
            ErrorKind::UnknownMethod,
            format!("cannot spawn {} version {}", name, version),
        ));
    }
    Ok(())
}

/// Produce the child's context handle from the third argument.
fn spawn_context(
    frame: &Frame<'_>,
    arg: &ExpressionAst,
) -> Result<Rc<Value>, RuntimeError> {
    if arg.is_context_root() {
        return frame.context_rc().cloned().ok_or_else(|| {
            RuntimeError::new(ErrorKind::PathUnresolved, "agent has no context to pass on")
        });
    }
    match evaluate_expression(frame, arg)? {
        Evaluated::Computed(value @ Value::Map(_)) => Ok(Rc::new(value)),
        Evaluated::Borrowed(Value::Map(_)) => Err(RuntimeError::new(
            ErrorKind::ContainerCopy,
            "spawn context must be the agent's own context (maps cannot be copied)",
        )),
        Evaluated::Computed(other) => Err(RuntimeError::new(
            ErrorKind::TypeMismatch,
            format!("spawn context must be a map, got {}", other.type_name()),
        )),
        Evaluated::Borrowed(other) => Err(RuntimeError::new(
            ErrorKind::TypeMismatch,
            format!("spawn context must be a map, got {}", other.type_name()),
        )),
    }
}
