//! System: top-level composition and the message loop
//!
//! Owns the log, the agency, and the interpreter. One tick of the loop
//! picks the earliest-registered agent with a pending message, pops one
//! message, executes the agent's method against it, and drops the
//! message. That is the whole scheduler: single-threaded, cooperative,
//! strictly FIFO per agent.

use crate::agency::Agency;
use crate::agent::AgentId;
use crate::config::RuntimeConfig;
use crate::interpreter::Interpreter;
use agerun_core::{ErrorKind, Log};
use std::rc::Rc;

pub struct System {
    log: Rc<Log>,
    config: RuntimeConfig,
    agency: Agency,
    interpreter: Interpreter,
    initialized: bool,
}

impl Default for System {
    fn default() -> Self {
        System::new()
    }
}

impl System {
    pub fn new() -> System {
        System::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> System {
        let log = Rc::new(Log::new());
        let agency = Agency::new(
            log.clone(),
            config.methodology_path.clone(),
            config.agent_store_path.clone(),
        );
        System {
            interpreter: Interpreter::new(log.clone()),
            agency,
            config,
            log,
            initialized: false,
        }
    }

    pub fn log(&self) -> &Rc<Log> {
        &self.log
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn agency(&self) -> &Agency {
        &self.agency
    }

    pub fn agency_mut(&mut self) -> &mut Agency {
        &mut self.agency
    }

    /// Start the system: load persisted state and optionally spawn the
    /// bootstrap agent (falling back to the configured one). Returns the
    /// bootstrap agent's id, or 0 when none was spawned or the spawn
    /// failed.
    pub fn init(&mut self, method_name: Option<&str>, version: Option<&str>) -> AgentId {
        if self.initialized {
            tracing::warn!("system is already initialized");
            return 0;
        }
        self.initialized = true;

        if !self.agency.methodology_mut().load_methods() {
            tracing::warn!("could not load methods from file");
        }
        if !self.agency.load_agents() {
            tracing::warn!("could not load agents from file");
        }

        let configured_method = self.config.bootstrap_method.clone();
        let configured_version = self.config.bootstrap_version.clone();
        let Some(name) = method_name.or(configured_method.as_deref()) else {
            return 0;
        };
        let version = version.or(configured_version.as_deref());

        let id = self.agency.create_agent(name, version, None);
        if id == 0 {
            self.log.error(
                ErrorKind::Bootstrap,
                format!("cannot spawn bootstrap agent running {}", name),
            );
        }
        id
    }

    /// One tick: deliver one message to the earliest-registered agent
    /// with work. Returns whether anything was processed.
    pub fn process_next_message(&mut self) -> bool {
        let ids = self.agency.agent_ids();
        for id in ids {
            let Some(message) = self.agency.dequeue_message(id) else {
                continue;
            };
            tracing::debug!(agent = id, kind = message.type_name(), "processing message");
            self.interpreter.execute(&mut self.agency, id, &message);
            drop(message);
            return true;
        }
        false
    }

    /// Drain every queue, counting messages processed. New messages
    /// enqueued along the way are processed too.
    pub fn process_all_messages(&mut self) -> usize {
        let mut count = 0;
        while self.process_next_message() {
            count += 1;
        }
        count
    }

    /// Stop the system: persist the catalog and the population, then tear
    /// down all agents.
    pub fn shutdown(&mut self) {
        self.agency.methodology().save_methods();
        self.agency.save_agents();
        self.agency.reset();
        self.initialized = false;
    }
}
