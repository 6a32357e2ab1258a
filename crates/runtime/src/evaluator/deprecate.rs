//! Deprecate: `deprecate(name, version)`
//!
//! Unregisters the exact (name, version) from the methodology. Agents
//! already bound to the method keep their shared handle and continue to
//! run; only resolution of new references is affected. The stored result
//! is 1 when something was unregistered, 0 otherwise - an unknown method
//! is not an instruction failure.

use super::{store_result, string_arg};
use crate::agency::Agency;
use crate::frame::Frame;
use agerun_core::{RuntimeError, Value};
use agerun_lang::ast::{ExpressionAst, MemoryPath};

pub(crate) fn evaluate(
    agency: &mut Agency,
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let name = string_arg(frame, &args[0], "deprecate name")?;
    let version = string_arg(frame, &args[1], "deprecate version")?;

    let removed = agency.methodology_mut().unregister(&name, &version);
    store_result(
        frame,
        result_path,
        Value::Integer(if removed { 1 } else { 0 }),
    )
}
