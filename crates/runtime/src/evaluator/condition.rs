//! If: `if(cond, a, b)`
//!
//! Short-circuiting: only the chosen branch is evaluated, so an error in
//! the other branch can never fire. The chosen value is stored to the
//! result path (or dropped without one).

use super::store_result;
use crate::expression_evaluator::evaluate as evaluate_expression;
use crate::frame::Frame;
use agerun_core::RuntimeError;
use agerun_lang::ast::{ExpressionAst, MemoryPath};

pub(crate) fn evaluate(
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let truthy = evaluate_expression(frame, &args[0])?.as_value().is_truthy();
    let chosen = if truthy { &args[1] } else { &args[2] };
    let value = evaluate_expression(frame, chosen)?.into_owned()?;
    store_result(frame, result_path, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agerun_core::{ErrorKind, Value};
    use agerun_lang::ast::{FunctionKind, InstructionAst};
    use agerun_lang::parse_instruction;
    use std::rc::Rc;

    fn run(memory: &mut Value, line: &str) -> Result<(), RuntimeError> {
        let message = Rc::new(Value::from("m"));
        let mut frame = Frame::new(memory, None, &message);
        match parse_instruction(line).unwrap() {
            InstructionAst::FunctionCall {
                kind: FunctionKind::If,
                args,
                result_path,
                ..
            } => evaluate(&mut frame, &args, result_path.as_ref()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_truthy_picks_first_branch() {
        let mut memory = Value::empty_map();
        run(&mut memory, r#"memory.r := if(1, "one", "other")"#).unwrap();
        assert_eq!(
            memory.as_map().unwrap().get("r"),
            Some(&Value::from("one"))
        );
    }

    #[test]
    fn test_falsy_picks_second_branch() {
        let mut memory = Value::empty_map();
        run(&mut memory, r#"memory.r := if(0, "one", "other")"#).unwrap();
        assert_eq!(
            memory.as_map().unwrap().get("r"),
            Some(&Value::from("other"))
        );
    }

    #[test]
    fn test_equality_condition() {
        let mut memory = Value::empty_map();
        memory
            .as_map_mut()
            .unwrap()
            .insert("x".to_string(), Value::Integer(1));
        run(
            &mut memory,
            r#"memory.r := if(memory.x = 1, "one", "other")"#,
        )
        .unwrap();
        assert_eq!(memory.as_map().unwrap().get("r"), Some(&Value::from("one")));
    }

    #[test]
    fn test_unchosen_branch_is_never_evaluated() {
        // The error in the unchosen branch must not fire.
        let mut memory = Value::empty_map();
        run(&mut memory, "memory.r := if(1, 10, 1 / 0)").unwrap();
        assert_eq!(memory.as_map().unwrap().get("r"), Some(&Value::Integer(10)));

        let err = run(&mut memory, "memory.r := if(0, 10, 1 / 0)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_non_empty_string_is_truthy() {
        let mut memory = Value::empty_map();
        run(&mut memory, r#"memory.r := if("yes", 1, 2)"#).unwrap();
        assert_eq!(memory.as_map().unwrap().get("r"), Some(&Value::Integer(1)));
        run(&mut memory, r#"memory.r := if("", 1, 2)"#).unwrap();
        assert_eq!(memory.as_map().unwrap().get("r"), Some(&Value::Integer(2)));
    }
}
