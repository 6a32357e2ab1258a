//! Compile: `compile(name, source, version)`
//!
//! Creates a method from string arguments and registers it with the
//! methodology. A source that fails to parse still registers (the method
//! simply cannot execute), so compilation reports success for it. A
//! duplicate (name, version) is a version conflict: 0 is stored and the
//! instruction fails.

use super::{store_result, string_arg};
use crate::agency::Agency;
use crate::frame::Frame;
use crate::method::Method;
use agerun_core::{ErrorKind, RuntimeError, Value};
use agerun_lang::ast::{ExpressionAst, MemoryPath};
use std::rc::Rc;

pub(crate) fn evaluate(
    agency: &mut Agency,
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let name = string_arg(frame, &args[0], "compile name")?;
    let source = string_arg(frame, &args[1], "compile source")?;
    let version = string_arg(frame, &args[2], "compile version")?;

    if agency.methodology().has_exact(&name, &version) {
        store_result(frame, result_path, Value::Integer(0))?;
        return Err(RuntimeError::new(
            ErrorKind::VersionConflict,
            format!("method {} version {} is already registered", name, version),
        ));
    }

    let log = agency.log().clone();
    let method = match Method::new(&name, &source, &version, &log) {
        Ok(method) => method,
        Err(err) => {
            store_result(frame, result_path, Value::Integer(0))?;
            return Err(err);
        }
    };

    if let Err(err) = agency.methodology_mut().register(Rc::new(method)) {
        store_result(frame, result_path, Value::Integer(0))?;
        return Err(err);
    }
    store_result(frame, result_path, Value::Integer(1))
}
