//! Send: `send(target_id, msg)`
//!
//! Ownership of the message transfers to the target's queue. Forwarding
//! the current message (`send(id, message)`) shares the handle the frame
//! already holds; any other argument is claimed or shallow-copied, so a
//! borrowed container that is not the message root cannot be sent.
//!
//! Target 0 is a sink: the message is dropped and the call reports 1.

use super::{integer_arg, store_result};
use crate::agency::Agency;
use crate::expression_evaluator::evaluate as evaluate_expression;
use crate::frame::Frame;
use agerun_core::{ErrorKind, RuntimeError, Value};
use agerun_lang::ast::{ExpressionAst, MemoryPath};
use std::rc::Rc;

pub(crate) fn evaluate(
    agency: &mut Agency,
    frame: &mut Frame<'_>,
    args: &[ExpressionAst],
    result_path: Option<&MemoryPath>,
) -> Result<(), RuntimeError> {
    let target = integer_arg(frame, &args[0], "send target")?;

    let message: Rc<Value> = if args[1].is_message_root() {
        frame.message_rc().clone()
    } else {
        Rc::new(evaluate_expression(frame, &args[1])?.into_owned()?)
    };

    if target == 0 {
        drop(message);
        return store_result(frame, result_path, Value::Integer(1));
    }

    if agency.send(target, message) {
        store_result(frame, result_path, Value::Integer(1))
    } else {
        store_result(frame, result_path, Value::Integer(0))?;
        Err(RuntimeError::new(
            ErrorKind::UnknownAgent,
            format!("send to unknown agent {}", target),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agerun_core::{Log, Map};
    use agerun_lang::ast::{FunctionKind, InstructionAst};
    use agerun_lang::parse_instruction;

    fn agency() -> (Agency, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = Rc::new(Log::new());
        let mut agency = Agency::new(
            log,
            dir.path().join("methods.catalog"),
            dir.path().join("agents.yaml"),
        );
        agency
            .methodology_mut()
            .create_method("sink", "memory.last := message", "1.0.0");
        (agency, dir)
    }

    fn run(
        agency: &mut Agency,
        memory: &mut Value,
        message: &Rc<Value>,
        line: &str,
    ) -> Result<(), RuntimeError> {
        let mut frame = Frame::new(memory, None, message);
        match parse_instruction(line).unwrap() {
            InstructionAst::FunctionCall {
                kind: FunctionKind::Send,
                args,
                result_path,
                ..
            } => evaluate(agency, &mut frame, &args, result_path.as_ref()),
            other => panic!("expected send, got {:?}", other),
        }
    }

    #[test]
    fn test_send_to_zero_is_noop_returning_one() {
        let (mut agency, _dir) = agency();
        let mut memory = Value::empty_map();
        let message = Rc::new(Value::from("m"));
        run(&mut agency, &mut memory, &message, "memory.r := send(0, 42)").unwrap();
        assert_eq!(memory.as_map().unwrap().get("r"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_send_enqueues_on_target() {
        let (mut agency, _dir) = agency();
        let target = agency.create_agent("sink", None, None);
        agency.dequeue_message(target); // discard wake

        let mut memory = Value::empty_map();
        let message = Rc::new(Value::from("m"));
        run(
            &mut agency,
            &mut memory,
            &message,
            &format!("send({}, \"payload\")", target),
        )
        .unwrap();

        let delivered = agency.dequeue_message(target).unwrap();
        assert_eq!(delivered.as_str(), Some("payload"));
    }

    #[test]
    fn test_send_unknown_agent_stores_zero_and_fails() {
        let (mut agency, _dir) = agency();
        let mut memory = Value::empty_map();
        let message = Rc::new(Value::from("m"));
        let err = run(
            &mut agency,
            &mut memory,
            &message,
            "memory.r := send(99, 1)",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownAgent);
        assert_eq!(memory.as_map().unwrap().get("r"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_forwarding_message_root_shares_the_handle() {
        let (mut agency, _dir) = agency();
        let target = agency.create_agent("sink", None, None);
        agency.dequeue_message(target);

        let mut payload = Map::new();
        payload.insert("text".to_string(), Value::from("hi"));
        let message = Rc::new(Value::Map(payload));

        let mut memory = Value::empty_map();
        run(
            &mut agency,
            &mut memory,
            &message,
            &format!("send({}, message)", target),
        )
        .unwrap();

        let delivered = agency.dequeue_message(target).unwrap();
        assert!(Rc::ptr_eq(&delivered, &message));
    }

    #[test]
    fn test_sending_borrowed_container_field_fails() {
        let (mut agency, _dir) = agency();
        let target = agency.create_agent("sink", None, None);

        let mut inner = Map::new();
        inner.insert("k".to_string(), Value::Integer(1));
        let mut payload = Map::new();
        payload.insert("nested".to_string(), Value::Map(inner));
        let message = Rc::new(Value::Map(payload));

        let mut memory = Value::empty_map();
        let err = run(
            &mut agency,
            &mut memory,
            &message,
            &format!("send({}, message.nested)", target),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContainerCopy);
    }
}
