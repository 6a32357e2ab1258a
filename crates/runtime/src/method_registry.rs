//! Method registry: the catalog of registered methods
//!
//! Keyed by method name, each name holding its versions in registration
//! order. Name order is also preserved so the persisted catalog is stable
//! across save/load cycles. At most one method per (name, version).

use crate::method::Method;
use agerun_core::{ErrorKind, RuntimeError, semver};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct MethodRegistry {
    /// Names in first-registration order.
    order: Vec<String>,
    versions: HashMap<String, Vec<Rc<Method>>>,
}

impl MethodRegistry {
    pub fn new() -> MethodRegistry {
        MethodRegistry::default()
    }

    /// Register a method. Fails with `VersionConflict` when the exact
    /// (name, version) is already present.
    pub fn register(&mut self, method: Rc<Method>) -> Result<(), RuntimeError> {
        if self.get_exact(method.name(), method.version()).is_some() {
            return Err(RuntimeError::new(
                ErrorKind::VersionConflict,
                format!(
                    "method {} version {} is already registered",
                    method.name(),
                    method.version()
                ),
            ));
        }
        let name = method.name().to_string();
        let entry = self.versions.entry(name.clone()).or_default();
        if entry.is_empty() {
            self.order.push(name);
        }
        entry.push(method);
        Ok(())
    }

    /// Remove the exact (name, version), returning the method if present.
    /// Agents holding the method keep it alive through their own `Rc`.
    pub fn unregister(&mut self, name: &str, version: &str) -> Option<Rc<Method>> {
        let entry = self.versions.get_mut(name)?;
        let index = entry.iter().position(|m| m.version() == version)?;
        let removed = entry.remove(index);
        if entry.is_empty() {
            self.versions.remove(name);
            self.order.retain(|n| n != name);
        }
        Some(removed)
    }

    pub fn get_exact(&self, name: &str, version: &str) -> Option<&Rc<Method>> {
        self.versions
            .get(name)?
            .iter()
            .find(|m| m.version() == version)
    }

    /// The semver-greatest version registered under `name`.
    pub fn get_latest(&self, name: &str) -> Option<&Rc<Method>> {
        // Duplicate versions cannot coexist, so ties never arise.
        self.versions
            .get(name)?
            .iter()
            .max_by(|a, b| semver::compare(a.version(), b.version()))
    }

    /// Registered names, in first-registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Versions of one name, in registration order.
    pub fn versions_of(&self, name: &str) -> &[Rc<Method>] {
        self.versions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered (name, version) pairs.
    pub fn method_count(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }

    pub fn name_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.versions.clear();
    }
}
