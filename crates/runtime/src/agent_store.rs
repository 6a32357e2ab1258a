//! Agent persistence: the YAML population file
//!
//! The file is a map with one top-level key, `agents:`, holding a list of
//! entries: `id`, `method_name`, `method_version`, and the agent's
//! `memory` (nested maps of scalars preserved). Runtime values are bridged
//! through owned `Stored*` serde types rather than serialized directly -
//! the runtime `Value` is deliberately not `Clone`/`Serialize`.
//!
//! Saves are atomic with a backup, like the methodology store. A missing
//! file on load is silently fine; a malformed one is logged and leaves the
//! population untouched.

use crate::agent::Agent;
use crate::agent_registry::AgentRegistry;
use crate::methodology::Methodology;
use crate::persist;
use agerun_core::{ErrorKind, Log, Map, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Serializable mirror of `Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Integer(i64),
    Double(f64),
    String(String),
    List(Vec<StoredValue>),
    Map(BTreeMap<String, StoredValue>),
}

impl StoredValue {
    pub fn from_value(value: &Value) -> StoredValue {
        match value {
            Value::Integer(n) => StoredValue::Integer(*n),
            Value::Double(d) => StoredValue::Double(*d),
            Value::String(s) => StoredValue::String(s.clone()),
            Value::List(items) => {
                StoredValue::List(items.iter().map(StoredValue::from_value).collect())
            }
            Value::Map(map) => StoredValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), StoredValue::from_value(v)))
                    .collect(),
            ),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            StoredValue::Integer(n) => Value::Integer(n),
            StoredValue::Double(d) => Value::Double(d),
            StoredValue::String(s) => Value::String(s),
            StoredValue::List(items) => {
                Value::List(items.into_iter().map(StoredValue::into_value).collect())
            }
            StoredValue::Map(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect::<Map>(),
            ),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAgent {
    id: i64,
    method_name: String,
    method_version: String,
    memory: BTreeMap<String, StoredValue>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPopulation {
    agents: Vec<StoredAgent>,
}

#[derive(Debug)]
pub struct AgentStore {
    path: PathBuf,
}

impl AgentStore {
    pub fn new(path: impl Into<PathBuf>) -> AgentStore {
        AgentStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn delete(&self) -> bool {
        if !self.exists() {
            return true;
        }
        let _ = persist::create_backup(&self.path);
        fs::remove_file(&self.path).is_ok()
    }

    /// Persist every tracked agent: id, method binding, memory.
    pub fn save(&self, log: &Log, registry: &AgentRegistry) -> bool {
        let mut population = StoredPopulation::default();
        for id in registry.ids() {
            let Some(agent) = registry.get(id) else {
                continue;
            };
            let memory = agent
                .memory()
                .as_map()
                .map(|map| {
                    map.iter()
                        .map(|(k, v)| (k.clone(), StoredValue::from_value(v)))
                        .collect()
                })
                .unwrap_or_default();
            population.agents.push(StoredAgent {
                id,
                method_name: agent.method().name().to_string(),
                method_version: agent.method().version().to_string(),
                memory,
            });
        }

        let yaml = match serde_yaml::to_string(&population) {
            Ok(yaml) => yaml,
            Err(err) => {
                log.error(
                    ErrorKind::Persistence,
                    format!("cannot serialize agents: {}", err),
                );
                return false;
            }
        };

        if let Err(err) = persist::create_backup(&self.path) {
            log.error(
                ErrorKind::Persistence,
                format!("cannot back up {}: {}", self.path.display(), err),
            );
            return false;
        }
        if let Err(err) = persist::atomic_write(&self.path, &yaml) {
            log.error(
                ErrorKind::Persistence,
                format!("cannot write {}: {}", self.path.display(), err),
            );
            return false;
        }
        true
    }

    /// Restore agents into the registry, resolving each method binding
    /// through the methodology.
    ///
    /// Missing file: nothing to do, reports success. Malformed file: one
    /// `PersistenceError` record, population untouched, reports failure.
    /// Entries whose method is gone are skipped with an `UnknownMethod`
    /// record; the rest still load.
    pub fn load(
        &self,
        log: &Log,
        registry: &mut AgentRegistry,
        methodology: &Methodology,
    ) -> bool {
        if !self.exists() {
            return true;
        }
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                log.error(
                    ErrorKind::Persistence,
                    format!("cannot read {}: {}", self.path.display(), err),
                );
                return false;
            }
        };

        let population: StoredPopulation = match serde_yaml::from_str(&contents) {
            Ok(population) => population,
            Err(err) => {
                log.error(
                    ErrorKind::Persistence,
                    format!("invalid agent store {}: {}", self.path.display(), err),
                );
                return false;
            }
        };

        for stored in population.agents {
            let Some(method) =
                methodology.resolve(&stored.method_name, Some(&stored.method_version))
            else {
                log.error(
                    ErrorKind::UnknownMethod,
                    format!(
                        "agent {} references unknown method {} version {}",
                        stored.id, stored.method_name, stored.method_version
                    ),
                );
                continue;
            };

            let memory = Value::Map(
                stored
                    .memory
                    .into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect::<Map>(),
            );
            let agent = Agent::restore(stored.id, method, memory);
            if !registry.track_restored(agent) {
                log.error(
                    ErrorKind::Persistence,
                    format!("agent id {} is invalid or already tracked", stored.id),
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agerun_core::Log;
    use std::rc::Rc;

    fn setup() -> (Rc<Log>, Methodology, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = Rc::new(Log::new());
        let mut methodology = Methodology::new(log.clone(), dir.path().join("methods.catalog"));
        methodology.create_method("counter", "memory.n := memory.n + 1", "1.0.0");
        (log, methodology, dir)
    }

    #[test]
    fn test_save_load_round_trip() {
        let (log, methodology, dir) = setup();
        let store = AgentStore::new(dir.path().join("agents.yaml"));

        let mut registry = AgentRegistry::new();
        let method = methodology.resolve("counter", None).unwrap();
        let id = registry.track(Agent::new(method, None));
        {
            let agent = registry.get_mut(id).unwrap();
            let memory = agent.memory_mut().as_map_mut().unwrap();
            memory.insert("n".to_string(), Value::Integer(3));
            let mut nested = Map::new();
            nested.insert("host".to_string(), Value::from("local"));
            memory.insert("peer".to_string(), Value::Map(nested));
        }

        assert!(store.save(&log, &registry));

        let mut restored = AgentRegistry::new();
        assert!(store.load(&log, &mut restored, &methodology));
        assert_eq!(restored.count(), 1);

        let agent = restored.get(id).unwrap();
        assert_eq!(agent.method().name(), "counter");
        assert_eq!(agent.method().version(), "1.0.0");
        let memory = agent.memory().as_map().unwrap();
        assert_eq!(memory.get("n"), Some(&Value::Integer(3)));
        let peer = memory.get("peer").unwrap().as_map().unwrap();
        assert_eq!(peer.get("host"), Some(&Value::from("local")));

        // Restored population resumes id allocation past the old ids.
        assert_eq!(restored.next_id(), id + 1);
        assert!(!log.has_errors());
    }

    #[test]
    fn test_load_missing_file_is_fine() {
        let (log, methodology, dir) = setup();
        let store = AgentStore::new(dir.path().join("never-saved.yaml"));
        let mut registry = AgentRegistry::new();
        assert!(store.load(&log, &mut registry, &methodology));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_load_malformed_file_logs_and_leaves_population() {
        let (log, methodology, dir) = setup();
        let path = dir.path().join("agents.yaml");
        fs::write(&path, "agents: \"not a list\"\n").unwrap();

        let store = AgentStore::new(&path);
        let mut registry = AgentRegistry::new();
        assert!(!store.load(&log, &mut registry, &methodology));
        assert_eq!(registry.count(), 0);
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::Persistence);
    }

    #[test]
    fn test_load_skips_agents_with_unknown_method() {
        let (log, methodology, dir) = setup();
        let path = dir.path().join("agents.yaml");
        fs::write(
            &path,
            "agents:\n\
             - id: 1\n\
             \x20 method_name: counter\n\
             \x20 method_version: 1.0.0\n\
             \x20 memory: {}\n\
             - id: 2\n\
             \x20 method_name: vanished\n\
             \x20 method_version: 9.0.0\n\
             \x20 memory: {}\n",
        )
        .unwrap();

        let store = AgentStore::new(&path);
        let mut registry = AgentRegistry::new();
        assert!(store.load(&log, &mut registry, &methodology));
        assert_eq!(registry.count(), 1);
        assert!(registry.exists(1));
        assert!(!registry.exists(2));
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::UnknownMethod);
    }

    #[test]
    fn test_stored_value_round_trip() {
        let mut map = Map::new();
        map.insert("i".to_string(), Value::Integer(-4));
        map.insert("d".to_string(), Value::Double(2.5));
        map.insert("s".to_string(), Value::from("text"));
        map.insert(
            "l".to_string(),
            Value::List(vec![Value::Integer(1), Value::from("two")]),
        );
        let original = Value::Map(map);

        let stored = StoredValue::from_value(&original);
        assert_eq!(stored.into_value(), original);
    }
}
