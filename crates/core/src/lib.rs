//! AgeRun core: the data model shared by every layer of the runtime
//!
//! Key design principles:
//! - Value: what agents talk about (Integer, Double, String, List, Map)
//! - Ownership: move semantics, with shallow-copy-only duplication
//! - Log: append-only structured diagnostics; errors never reach the host
//! - Semver: version triples with partial-pattern resolution

pub mod error;
pub mod log;
pub mod semver;
pub mod value;

// Re-export key types
pub use error::{ErrorKind, RuntimeError};
pub use log::Log;
pub use value::{Evaluated, Map, Value, map_get_path, map_set_path};
