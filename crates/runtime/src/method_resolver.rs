//! Version resolution over the method registry
//!
//! A version spec is resolved in three tiers:
//!
//! 1. `None` or empty - the latest registered version.
//! 2. A full `major.minor.patch` - the exact version only.
//! 3. A partial pattern (`"1"`, `"1.2"`) - the semver-greatest version
//!    whose leading components match.

use crate::method::Method;
use crate::method_registry::MethodRegistry;
use agerun_core::semver;
use std::rc::Rc;

/// Resolve `(name, spec)` against the registry.
pub fn resolve_method<'r>(
    registry: &'r MethodRegistry,
    name: &str,
    spec: Option<&str>,
) -> Option<&'r Rc<Method>> {
    let spec = match spec {
        None | Some("") => return registry.get_latest(name),
        Some(spec) => spec,
    };

    if semver::is_full(spec) {
        return registry.get_exact(name, spec);
    }

    let methods = registry.versions_of(name);
    let versions: Vec<&str> = methods.iter().map(|m| m.version()).collect();
    let index = semver::find_latest_matching(&versions, spec)?;
    Some(&methods[index])
}
