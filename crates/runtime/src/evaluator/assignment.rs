//! Assignment: `memory.path := expr`
//!
//! The parser guarantees the target is rooted at `memory`; here the
//! expression result is claimed (or shallow-copied) and stored, creating
//! intermediate maps along the path as needed.

use crate::expression_evaluator::evaluate as evaluate_expression;
use crate::frame::Frame;
use agerun_core::{RuntimeError, map_set_path};
use agerun_lang::ast::{ExpressionAst, MemoryPath};

pub(crate) fn evaluate(
    frame: &mut Frame<'_>,
    path: &MemoryPath,
    expr: &ExpressionAst,
) -> Result<(), RuntimeError> {
    let value = evaluate_expression(frame, expr)?.into_owned()?;
    map_set_path(frame.memory_map_mut(), path.segments(), value)
}
