//! Interpreter: one method invocation for one (agent, message)
//!
//! Builds a frame over the agent's state and walks the method's
//! instructions in order, stopping at the first failure. The agent's
//! memory map is detached for the duration of the call - the runtime is
//! single-threaded, so the gap is unobservable - which lets evaluators
//! hold the frame and mutate the agency (spawn, send) at the same time.
//!
//! The interpreter never frees the message: the message loop owns it and
//! drops it after execution.

use crate::agency::Agency;
use crate::agent::AgentId;
use crate::evaluator::InstructionEvaluator;
use crate::frame::Frame;
use agerun_core::{ErrorKind, Log, Value};
use std::rc::Rc;

pub struct Interpreter {
    log: Rc<Log>,
    evaluator: InstructionEvaluator,
}

impl Interpreter {
    pub fn new(log: Rc<Log>) -> Interpreter {
        Interpreter {
            evaluator: InstructionEvaluator::new(log.clone()),
            log,
        }
    }

    /// Run the agent's method once against `message`.
    pub fn execute(&self, agency: &mut Agency, agent_id: AgentId, message: &Rc<Value>) -> bool {
        let Some(agent) = agency.registry_mut().get_mut(agent_id) else {
            self.log.error(
                ErrorKind::UnknownAgent,
                format!("cannot execute method for unknown agent {}", agent_id),
            );
            return false;
        };

        let method = agent.method().clone();
        let Some(ast) = method.ast() else {
            self.log.error(
                ErrorKind::Parse,
                format!(
                    "method {} version {} has no parsed body",
                    method.name(),
                    method.version()
                ),
            );
            return false;
        };

        let context = agent.context().cloned();
        let mut memory = agent.detach_memory();

        let mut success = true;
        {
            let mut frame = Frame::new(&mut memory, context.as_ref(), message);
            for instruction in ast.instructions() {
                if !self.evaluator.evaluate(agency, &mut frame, instruction) {
                    success = false;
                    break;
                }
            }
        }

        // The agent cannot have vanished mid-run (there is no destroy
        // instruction), but stay defensive about the reattach.
        if let Some(agent) = agency.registry_mut().get_mut(agent_id) {
            agent.attach_memory(memory);
        }
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Rc<Log>, Agency, Interpreter, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = Rc::new(Log::new());
        let agency = Agency::new(
            log.clone(),
            dir.path().join("methods.catalog"),
            dir.path().join("agents.yaml"),
        );
        let interpreter = Interpreter::new(log.clone());
        (log, agency, interpreter, dir)
    }

    #[test]
    fn test_execute_runs_instructions_in_order() {
        let (_log, mut agency, interpreter, _dir) = setup();
        agency.methodology_mut().create_method(
            "steps",
            "memory.a := 1\nmemory.b := memory.a + 1",
            "1.0.0",
        );
        let id = agency.create_agent("steps", None, None);

        let message = Rc::new(Value::from("go"));
        assert!(interpreter.execute(&mut agency, id, &message));

        let memory = agency.get_memory(id).unwrap().as_map().unwrap();
        assert_eq!(memory.get("a"), Some(&Value::Integer(1)));
        assert_eq!(memory.get("b"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_execute_unknown_agent_logs() {
        let (log, mut agency, interpreter, _dir) = setup();
        let message = Rc::new(Value::from("m"));
        assert!(!interpreter.execute(&mut agency, 42, &message));
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::UnknownAgent);
    }

    #[test]
    fn test_execute_method_without_ast_fails() {
        let (log, mut agency, interpreter, _dir) = setup();
        agency
            .methodology_mut()
            .create_method("broken", "not an instruction", "1.0.0");
        log.clear(); // drop the parse record from method creation
        let id = agency.create_agent("broken", None, None);

        let message = Rc::new(Value::from("m"));
        assert!(!interpreter.execute(&mut agency, id, &message));
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::Parse);
    }

    #[test]
    fn test_execute_stops_at_first_failure() {
        let (log, mut agency, interpreter, _dir) = setup();
        agency.methodology_mut().create_method(
            "partial",
            "memory.a := 1\nmemory.b := 1 / 0\nmemory.c := 3",
            "1.0.0",
        );
        let id = agency.create_agent("partial", None, None);

        let message = Rc::new(Value::from("m"));
        assert!(!interpreter.execute(&mut agency, id, &message));
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::DivisionByZero);

        let memory = agency.get_memory(id).unwrap().as_map().unwrap();
        assert_eq!(memory.get("a"), Some(&Value::Integer(1)));
        assert!(!memory.contains_key("b"));
        assert!(!memory.contains_key("c"));
    }

    #[test]
    fn test_memory_reattached_after_run() {
        let (_log, mut agency, interpreter, _dir) = setup();
        agency
            .methodology_mut()
            .create_method("inc", "memory.n := memory.n + 1", "1.0.0");
        let id = agency.create_agent("inc", None, None);
        {
            let memory = agency
                .registry_mut()
                .get_mut(id)
                .unwrap()
                .memory_mut()
                .as_map_mut()
                .unwrap();
            memory.insert("n".to_string(), Value::Integer(0));
        }

        let message = Rc::new(Value::from("m"));
        for _ in 0..3 {
            assert!(interpreter.execute(&mut agency, id, &message));
        }
        assert_eq!(
            agency.get_memory(id).unwrap().as_map().unwrap().get("n"),
            Some(&Value::Integer(3))
        );
    }
}
