//! Instruction evaluators
//!
//! One module per instruction kind, dispatched from
//! [`InstructionEvaluator::evaluate`]. Every evaluator follows the same
//! contract: it may read the frame, write at most one value to its result
//! path in memory, and route side effects (send, spawn, compile,
//! deprecate) through the agency. On failure it produces a single
//! [`RuntimeError`]; the dispatcher records it and reports `false`, and
//! the interpreter aborts the method there.

pub mod assignment;
pub mod build;
pub mod compile;
pub mod condition;
pub mod deprecate;
pub mod parse;
pub mod send;
pub mod spawn;

use crate::agency::Agency;
use crate::expression_evaluator::evaluate as evaluate_expression;
use crate::frame::Frame;
use agerun_core::{ErrorKind, Log, RuntimeError, Value, map_set_path};
use agerun_lang::ast::{ExpressionAst, FunctionKind, InstructionAst, MemoryPath};
use std::rc::Rc;

pub struct InstructionEvaluator {
    log: Rc<Log>,
}

impl InstructionEvaluator {
    pub fn new(log: Rc<Log>) -> InstructionEvaluator {
        InstructionEvaluator { log }
    }

    /// Execute one instruction against the frame. Errors are recorded on
    /// the log; the return value is the instruction's success flag.
    pub fn evaluate(
        &self,
        agency: &mut Agency,
        frame: &mut Frame<'_>,
        instruction: &InstructionAst,
    ) -> bool {
        let result = match instruction {
            InstructionAst::Assignment { path, expr, .. } => {
                assignment::evaluate(frame, path, expr)
            }
            InstructionAst::FunctionCall {
                kind,
                args,
                result_path,
                ..
            } => {
                let result_path = result_path.as_ref();
                match kind {
                    FunctionKind::Send => send::evaluate(agency, frame, args, result_path),
                    FunctionKind::If => condition::evaluate(frame, args, result_path),
                    FunctionKind::Parse => parse::evaluate(frame, args, result_path),
                    FunctionKind::Build => build::evaluate(frame, args, result_path),
                    FunctionKind::Compile => compile::evaluate(agency, frame, args, result_path),
                    FunctionKind::Spawn => spawn::evaluate(agency, frame, args, result_path),
                    FunctionKind::Deprecate => {
                        deprecate::evaluate(agency, frame, args, result_path)
                    }
                }
            }
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                self.log.report(err);
                false
            }
        }
    }
}

/// Write a call's returned value to its result path, if one was given.
/// Without a result path the value is simply dropped.
pub(crate) fn store_result(
    frame: &mut Frame<'_>,
    result_path: Option<&MemoryPath>,
    value: Value,
) -> Result<(), RuntimeError> {
    match result_path {
        Some(path) => map_set_path(frame.memory_map_mut(), path.segments(), value),
        None => Ok(()),
    }
}

/// Evaluate an argument expected to be a string.
pub(crate) fn string_arg(
    frame: &Frame<'_>,
    arg: &ExpressionAst,
    what: &str,
) -> Result<String, RuntimeError> {
    let evaluated = evaluate_expression(frame, arg)?;
    match evaluated.as_value().as_str() {
        Some(text) => Ok(text.to_string()),
        None => Err(RuntimeError::new(
            ErrorKind::TypeMismatch,
            format!(
                "{} must be a string, got {}",
                what,
                evaluated.as_value().type_name()
            ),
        )),
    }
}

/// Evaluate an argument expected to be an integer.
pub(crate) fn integer_arg(
    frame: &Frame<'_>,
    arg: &ExpressionAst,
    what: &str,
) -> Result<i64, RuntimeError> {
    let evaluated = evaluate_expression(frame, arg)?;
    match evaluated.as_value().as_integer() {
        Some(n) => Ok(n),
        None => Err(RuntimeError::new(
            ErrorKind::TypeMismatch,
            format!(
                "{} must be an integer, got {}",
                what,
                evaluated.as_value().type_name()
            ),
        )),
    }
}
