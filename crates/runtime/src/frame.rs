//! Evaluation frame
//!
//! The triple every instruction executes against: the agent's mutable
//! memory map, its (optional) shared context, and the message being
//! processed. The frame borrows - it never owns - so nothing here outlives
//! one interpreter call.

use agerun_core::{Map, Value};
use std::rc::Rc;

pub struct Frame<'a> {
    /// Agent memory; always a `Value::Map`.
    memory: &'a mut Value,
    context: Option<&'a Rc<Value>>,
    message: &'a Rc<Value>,
}

impl<'a> Frame<'a> {
    /// Build a frame over an agent's state.
    ///
    /// `memory` must be a map value; the agent guarantees this.
    pub fn new(
        memory: &'a mut Value,
        context: Option<&'a Rc<Value>>,
        message: &'a Rc<Value>,
    ) -> Frame<'a> {
        debug_assert!(memory.as_map().is_some(), "agent memory must be a map");
        Frame {
            memory,
            context,
            message,
        }
    }

    pub fn memory(&self) -> &Value {
        self.memory
    }

    pub fn memory_map(&self) -> &Map {
        self.memory.as_map().expect("agent memory must be a map")
    }

    pub fn memory_map_mut(&mut self) -> &mut Map {
        self.memory
            .as_map_mut()
            .expect("agent memory must be a map")
    }

    pub fn context(&self) -> Option<&Value> {
        self.context.map(|rc| rc.as_ref())
    }

    /// The shared context handle, for evaluators that pass it along
    /// (spawn stores it on the new agent).
    pub fn context_rc(&self) -> Option<&Rc<Value>> {
        self.context
    }

    pub fn message(&self) -> &Value {
        self.message
    }

    /// The shared message handle, for forwarding sends.
    pub fn message_rc(&self) -> &Rc<Value> {
        self.message
    }
}
