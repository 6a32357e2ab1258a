//! Agency: the container of all agents in one runtime
//!
//! Owns the methodology and the agent registry, and fronts both with the
//! operations instruction evaluators and hosts consume: create, destroy,
//! send, persistence, and the agent-update sweep. Creation of an agency
//! implies creation of its methodology and registry; destruction cascades.

use crate::agent::{Agent, AgentId};
use crate::agent_registry::AgentRegistry;
use crate::agent_store::AgentStore;
use crate::method::Method;
use crate::methodology::Methodology;
use agerun_core::{ErrorKind, Log, Value, semver};
use std::path::PathBuf;
use std::rc::Rc;

pub struct Agency {
    log: Rc<Log>,
    methodology: Methodology,
    registry: AgentRegistry,
    store: AgentStore,
}

impl Agency {
    pub fn new(
        log: Rc<Log>,
        methodology_path: impl Into<PathBuf>,
        agent_store_path: impl Into<PathBuf>,
    ) -> Agency {
        Agency {
            methodology: Methodology::new(log.clone(), methodology_path),
            registry: AgentRegistry::new(),
            store: AgentStore::new(agent_store_path),
            log,
        }
    }

    pub fn log(&self) -> &Rc<Log> {
        &self.log
    }

    pub fn methodology(&self) -> &Methodology {
        &self.methodology
    }

    pub fn methodology_mut(&mut self) -> &mut Methodology {
        &mut self.methodology
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    /// Create an agent running `(name, version_spec)`.
    ///
    /// Returns the new id, or 0 when the method cannot be resolved. The
    /// agent's `__wake__` is queued before any external sender can reach
    /// it.
    pub fn create_agent(
        &mut self,
        method_name: &str,
        version_spec: Option<&str>,
        context: Option<Rc<Value>>,
    ) -> AgentId {
        let Some(method) = self.methodology.resolve(method_name, version_spec) else {
            return 0;
        };
        let id = self.registry.track(Agent::new(method, context));
        tracing::debug!(agent = id, method = method_name, "agent created");
        id
    }

    /// Destroy an agent: queue its sleep message, drain the inbox, drop.
    pub fn destroy_agent(&mut self, id: AgentId) -> bool {
        match self.registry.untrack(id) {
            Some(mut agent) => {
                agent.shut_down();
                tracing::debug!(agent = id, "agent destroyed");
                true
            }
            None => {
                self.log.error(
                    ErrorKind::UnknownAgent,
                    format!("cannot destroy unknown agent {}", id),
                );
                false
            }
        }
    }

    /// Deliver a message to an agent's inbox. Takes ownership of the
    /// handle; on an unknown id the message is dropped and false returned.
    pub fn send(&mut self, id: AgentId, message: Rc<Value>) -> bool {
        match self.registry.get_mut(id) {
            Some(agent) => {
                agent.enqueue(message);
                true
            }
            None => false,
        }
    }

    pub fn agent_exists(&self, id: AgentId) -> bool {
        self.registry.exists(id)
    }

    pub fn agent_has_messages(&self, id: AgentId) -> bool {
        self.registry.get(id).is_some_and(Agent::has_messages)
    }

    /// Pop the oldest pending message; ownership moves to the caller.
    pub fn dequeue_message(&mut self, id: AgentId) -> Option<Rc<Value>> {
        self.registry.get_mut(id)?.dequeue()
    }

    pub fn get_memory(&self, id: AgentId) -> Option<&Value> {
        self.registry.get(id).map(Agent::memory)
    }

    pub fn get_memory_mut(&mut self, id: AgentId) -> Option<&mut Value> {
        self.registry.get_mut(id).map(Agent::memory_mut)
    }

    pub fn get_method(&self, id: AgentId) -> Option<&Rc<Method>> {
        self.registry.get(id).map(Agent::method)
    }

    /// Ids in registration order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.registry.ids().collect()
    }

    pub fn agent_count(&self) -> usize {
        self.registry.count()
    }

    /// How many agents are bound to exactly this method object.
    pub fn count_agents_using_method(&self, method: &Rc<Method>) -> usize {
        self.registry
            .ids()
            .filter_map(|id| self.registry.get(id))
            .filter(|agent| Rc::ptr_eq(agent.method(), method))
            .count()
    }

    /// Rebind every agent running `old` to the compatible `new` version.
    ///
    /// The methods must share a name and a major version; incompatible
    /// updates touch nothing. Returns the number of agents rebound. With
    /// `send_lifecycle_events`, each rebound agent gets `__sleep__` and
    /// `__wake__` queued around the swap.
    pub fn update_agent_methods(
        &mut self,
        old: &Rc<Method>,
        new: &Rc<Method>,
        send_lifecycle_events: bool,
    ) -> usize {
        if old.name() != new.name() || !semver::are_compatible(old.version(), new.version()) {
            tracing::warn!(
                method = old.name(),
                old_version = old.version(),
                new_version = new.version(),
                "cannot update agents to incompatible method version"
            );
            return 0;
        }

        let ids: Vec<AgentId> = self.registry.ids().collect();
        let mut count = 0;
        for id in ids {
            let Some(agent) = self.registry.get_mut(id) else {
                continue;
            };
            if Rc::ptr_eq(agent.method(), old) {
                agent.rebind_method(new.clone(), send_lifecycle_events);
                count += 1;
            }
        }
        if count > 0 {
            tracing::info!(
                method = old.name(),
                old_version = old.version(),
                new_version = new.version(),
                count,
                "updated agents to new method version"
            );
        }
        count
    }

    /// Destroy every agent and restart id allocation (shutdown path).
    pub fn reset(&mut self) {
        self.registry.reset();
    }

    pub fn save_agents(&self) -> bool {
        self.store.save(&self.log, &self.registry)
    }

    pub fn load_agents(&mut self) -> bool {
        self.store
            .load(&self.log, &mut self.registry, &self.methodology)
    }
}
