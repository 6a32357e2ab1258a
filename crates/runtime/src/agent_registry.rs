//! Agent registry: id allocation and the active-agent set
//!
//! Ids are allocated from a monotonic counter starting at 1 and are never
//! reused within a run. Iteration follows registration order - the message
//! loop depends on that for its fairness guarantee.

use crate::agent::{Agent, AgentId};
use std::collections::HashMap;

#[derive(Debug)]
pub struct AgentRegistry {
    /// Ids in registration order.
    order: Vec<AgentId>,
    agents: HashMap<AgentId, Agent>,
    next_id: AgentId,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        AgentRegistry {
            order: Vec::new(),
            agents: HashMap::new(),
            next_id: 1,
        }
    }
}

impl AgentRegistry {
    pub fn new() -> AgentRegistry {
        AgentRegistry::default()
    }

    /// Assign the next id to `agent` and start tracking it.
    pub fn track(&mut self, mut agent: Agent) -> AgentId {
        let id = self.next_id;
        self.next_id += 1;
        agent.set_id(id);
        self.order.push(id);
        self.agents.insert(id, agent);
        id
    }

    /// Track a restored agent under its persisted id, advancing the id
    /// counter past it. Returns false when the id is taken or invalid.
    pub fn track_restored(&mut self, agent: Agent) -> bool {
        let id = agent.id();
        if id <= 0 || self.agents.contains_key(&id) {
            return false;
        }
        self.order.push(id);
        self.agents.insert(id, agent);
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        true
    }

    /// Stop tracking, returning the agent for teardown.
    pub fn untrack(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(&id)?;
        self.order.retain(|tracked| *tracked != id);
        Some(agent)
    }

    pub fn exists(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.order.iter().copied()
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn next_id(&self) -> AgentId {
        self.next_id
    }

    /// Drop every agent and restart id allocation.
    pub fn reset(&mut self) {
        for (_, mut agent) in self.agents.drain() {
            agent.shut_down();
        }
        self.order.clear();
        self.next_id = 1;
    }
}
