//! Methodology: the facade over the method catalog
//!
//! Bundles the registry, version resolution, and the persistent store
//! behind the operations the rest of the runtime consumes: register,
//! unregister, resolve, save, load.

use crate::method::Method;
use crate::method_registry::MethodRegistry;
use crate::method_resolver::resolve_method;
use crate::method_store::MethodStore;
use agerun_core::{Log, RuntimeError};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct Methodology {
    log: Rc<Log>,
    registry: MethodRegistry,
    store: MethodStore,
}

impl Methodology {
    pub fn new(log: Rc<Log>, store_path: impl Into<PathBuf>) -> Methodology {
        Methodology {
            log,
            registry: MethodRegistry::new(),
            store: MethodStore::new(store_path),
        }
    }

    /// Register an already-built method.
    pub fn register(&mut self, method: Rc<Method>) -> Result<(), RuntimeError> {
        self.registry.register(method)
    }

    /// Create and register a method from source. Failures (empty name,
    /// version conflict) are logged and reported as `false`; a source that
    /// merely fails to parse still registers.
    pub fn create_method(&mut self, name: &str, source: &str, version: &str) -> bool {
        let method = match Method::new(name, source, version, &self.log) {
            Ok(method) => method,
            Err(err) => {
                self.log.report(err);
                return false;
            }
        };
        match self.registry.register(Rc::new(method)) {
            Ok(()) => true,
            Err(err) => {
                self.log.report(err);
                false
            }
        }
    }

    /// Unregister the exact (name, version). Agents already bound to the
    /// method keep running it.
    pub fn unregister(&mut self, name: &str, version: &str) -> bool {
        self.registry.unregister(name, version).is_some()
    }

    /// Resolve a name and version spec to a shared method handle.
    pub fn resolve(&self, name: &str, spec: Option<&str>) -> Option<Rc<Method>> {
        resolve_method(&self.registry, name, spec).cloned()
    }

    pub fn has_exact(&self, name: &str, version: &str) -> bool {
        self.registry.get_exact(name, version).is_some()
    }

    pub fn method_count(&self) -> usize {
        self.registry.method_count()
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    /// Persist the catalog.
    pub fn save_methods(&self) -> bool {
        self.store.save(&self.log, &self.registry)
    }

    /// Load the catalog from disk into the registry.
    pub fn load_methods(&mut self) -> bool {
        self.store.load(&self.log, &mut self.registry)
    }

    /// Drop every registered method (shutdown path).
    pub fn clear(&mut self) {
        self.registry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agerun_core::ErrorKind;

    fn methodology() -> (Rc<Log>, Methodology, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = Rc::new(Log::new());
        let methodology = Methodology::new(log.clone(), dir.path().join("methods.catalog"));
        (log, methodology, dir)
    }

    #[test]
    fn test_create_resolve_unregister() {
        let (_log, mut methodology, _dir) = methodology();
        assert!(methodology.create_method("echo", "send(0, message)", "1.0.0"));
        assert!(methodology.create_method("echo", "send(0, message)", "1.1.0"));

        assert_eq!(
            methodology.resolve("echo", None).unwrap().version(),
            "1.1.0"
        );
        assert!(methodology.unregister("echo", "1.1.0"));
        assert_eq!(
            methodology.resolve("echo", None).unwrap().version(),
            "1.0.0"
        );
        assert!(!methodology.unregister("echo", "1.1.0"));
    }

    #[test]
    fn test_duplicate_create_is_logged_conflict() {
        let (log, mut methodology, _dir) = methodology();
        assert!(methodology.create_method("m", "memory.x := 1", "1.0.0"));
        assert!(!methodology.create_method("m", "memory.x := 2", "1.0.0"));
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::VersionConflict);
        // The first registration is untouched.
        assert_eq!(
            methodology
                .resolve("m", Some("1.0.0"))
                .unwrap()
                .source(),
            "memory.x := 1"
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_log, mut methodology, _dir) = methodology();
        methodology.create_method("a", "memory.x := 1", "1.0.0");
        methodology.create_method("b", "memory.y := 2", "2.0.0");
        assert!(methodology.save_methods());

        methodology.clear();
        assert_eq!(methodology.method_count(), 0);
        assert!(methodology.load_methods());
        assert_eq!(methodology.method_count(), 2);
        assert!(methodology.has_exact("a", "1.0.0"));
        assert!(methodology.has_exact("b", "2.0.0"));
    }

    #[test]
    fn test_deprecated_method_survives_on_holders() {
        let (_log, mut methodology, _dir) = methodology();
        methodology.create_method("m", "memory.x := 1", "1.0.0");
        let held = methodology.resolve("m", Some("1.0.0")).unwrap();

        assert!(methodology.unregister("m", "1.0.0"));
        assert!(methodology.resolve("m", Some("1.0.0")).is_none());
        // The handle is still usable.
        assert_eq!(held.version(), "1.0.0");
        assert!(held.ast().is_some());
    }
}
