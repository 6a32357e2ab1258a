//! Agent: an addressable unit of computation
//!
//! An agent couples an id, a reference to the method it runs, a private
//! memory map, an optional shared context, and a FIFO inbox. Messages are
//! shared handles (`Rc<Value>`): enqueueing hands the message to the
//! agent, dequeueing hands it to the runtime, and forwarding a message to
//! another agent just shares the handle - the value itself is immutable.
//!
//! Creation enqueues a `__wake__` string before the agent is visible to
//! any sender, so waking is always the first thing an agent processes.
//! Destruction enqueues `__sleep__` and then drains the queue; the sleep
//! message is best-effort and in practice unobservable.

use crate::method::Method;
use agerun_core::Value;
use std::collections::VecDeque;
use std::rc::Rc;

/// Agent identifier; positive and unique within one agency. 0 is never a
/// valid id - sends to 0 are a sink.
pub type AgentId = i64;

pub const WAKE_MESSAGE: &str = "__wake__";
pub const SLEEP_MESSAGE: &str = "__sleep__";

#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    method: Rc<Method>,
    /// Always a `Value::Map`.
    memory: Value,
    context: Option<Rc<Value>>,
    queue: VecDeque<Rc<Value>>,
    active: bool,
}

impl Agent {
    /// Create an agent with empty memory and its wake message queued.
    pub fn new(method: Rc<Method>, context: Option<Rc<Value>>) -> Agent {
        let mut agent = Agent {
            id: 0, // assigned by the registry on track
            method,
            memory: Value::empty_map(),
            context,
            queue: VecDeque::new(),
            active: true,
        };
        agent.enqueue(Rc::new(Value::from(WAKE_MESSAGE)));
        agent
    }

    /// Rebuild an agent from persisted state. No wake message: the agent
    /// already woke in the run that persisted it.
    pub fn restore(id: AgentId, method: Rc<Method>, memory: Value) -> Agent {
        debug_assert!(memory.as_map().is_some(), "restored memory must be a map");
        Agent {
            id,
            method,
            memory,
            context: None,
            queue: VecDeque::new(),
            active: true,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: AgentId) {
        self.id = id;
    }

    pub fn method(&self) -> &Rc<Method> {
        &self.method
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn context(&self) -> Option<&Rc<Value>> {
        self.context.as_ref()
    }

    pub fn memory(&self) -> &Value {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Value {
        &mut self.memory
    }

    /// Detach the memory map for the duration of one interpreter call.
    /// The runtime is single-threaded; nobody can observe the gap.
    pub(crate) fn detach_memory(&mut self) -> Value {
        std::mem::replace(&mut self.memory, Value::empty_map())
    }

    pub(crate) fn attach_memory(&mut self, memory: Value) {
        debug_assert!(memory.as_map().is_some());
        self.memory = memory;
    }

    pub fn enqueue(&mut self, message: Rc<Value>) {
        self.queue.push_back(message);
    }

    pub fn dequeue(&mut self) -> Option<Rc<Value>> {
        self.queue.pop_front()
    }

    pub fn has_messages(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Peek without consuming, oldest first.
    pub fn peek_message(&self) -> Option<&Rc<Value>> {
        self.queue.front()
    }

    /// Swap in a new method version. When `send_sleep_wake` is set, the
    /// agent is told it is going down and coming back up around the swap.
    pub fn rebind_method(&mut self, method: Rc<Method>, send_sleep_wake: bool) {
        if send_sleep_wake {
            self.enqueue(Rc::new(Value::from(SLEEP_MESSAGE)));
        }
        self.method = method;
        if send_sleep_wake {
            self.enqueue(Rc::new(Value::from(WAKE_MESSAGE)));
        }
    }

    /// Teardown: queue the sleep message, then drain everything.
    pub(crate) fn shut_down(&mut self) {
        self.enqueue(Rc::new(Value::from(SLEEP_MESSAGE)));
        self.active = false;
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agerun_core::Log;

    fn test_method() -> Rc<Method> {
        let log = Log::new();
        Rc::new(Method::new("noop", "memory.x := 1", "1.0.0", &log).unwrap())
    }

    #[test]
    fn test_new_agent_has_wake_queued() {
        let agent = Agent::new(test_method(), None);
        assert!(agent.is_active());
        assert_eq!(agent.queue_len(), 1);
        assert_eq!(
            agent.peek_message().unwrap().as_str(),
            Some(WAKE_MESSAGE)
        );
        assert!(agent.memory().as_map().unwrap().is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let mut agent = Agent::new(test_method(), None);
        agent.dequeue(); // discard the wake
        agent.enqueue(Rc::new(Value::Integer(1)));
        agent.enqueue(Rc::new(Value::Integer(2)));

        assert_eq!(*agent.dequeue().unwrap(), Value::Integer(1));
        assert_eq!(*agent.dequeue().unwrap(), Value::Integer(2));
        assert!(agent.dequeue().is_none());
    }

    #[test]
    fn test_rebind_method_with_lifecycle_events() {
        let log = Log::new();
        let mut agent = Agent::new(test_method(), None);
        agent.dequeue();

        let newer = Rc::new(Method::new("noop", "memory.x := 2", "1.1.0", &log).unwrap());
        agent.rebind_method(newer.clone(), true);

        assert_eq!(agent.method().version(), "1.1.0");
        assert_eq!(agent.dequeue().unwrap().as_str(), Some(SLEEP_MESSAGE));
        assert_eq!(agent.dequeue().unwrap().as_str(), Some(WAKE_MESSAGE));
    }

    #[test]
    fn test_shut_down_drains_queue() {
        let mut agent = Agent::new(test_method(), None);
        agent.enqueue(Rc::new(Value::Integer(5)));
        agent.shut_down();
        assert!(!agent.is_active());
        assert!(!agent.has_messages());
    }

    #[test]
    fn test_restore_has_no_wake() {
        let agent = Agent::restore(7, test_method(), Value::empty_map());
        assert_eq!(agent.id(), 7);
        assert!(!agent.has_messages());
    }
}
