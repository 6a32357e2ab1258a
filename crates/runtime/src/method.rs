//! Method: a named, versioned program
//!
//! A method owns its source text and the AST parsed from it. Parsing
//! happens once, at creation; a source that fails to parse still produces
//! a registrable method (the catalog keeps its structure, execution fails
//! with a log record). Methods are immutable once created and shared via
//! `Rc` - agents hold references, the registry holds the canonical one,
//! and a deprecated method lives on until its last agent is gone.

use agerun_core::{ErrorKind, Log, RuntimeError};
use agerun_lang::ast::MethodAst;
use agerun_lang::instruction_parser::parse_method_source;

#[derive(Debug)]
pub struct Method {
    name: String,
    version: String,
    source: String,
    ast: Option<MethodAst>,
}

impl Method {
    /// Create a method, parsing its source.
    ///
    /// Fails only on an empty name or version; parse failures are recorded
    /// on the log and leave the method with no AST.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
        log: &Log,
    ) -> Result<Method, RuntimeError> {
        let name = name.into();
        let version = version.into();
        if name.is_empty() {
            return Err(RuntimeError::new(
                ErrorKind::Parse,
                "method name must not be empty",
            ));
        }
        if version.is_empty() {
            return Err(RuntimeError::new(
                ErrorKind::Parse,
                "method version must not be empty",
            ));
        }
        let source = source.into();
        let ast = parse_method_source(&source, log);
        Ok(Method {
            name,
            version,
            source,
            ast,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed body; `None` when the source failed to parse.
    pub fn ast(&self) -> Option<&MethodAst> {
        self.ast.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_parses_source() {
        let log = Log::new();
        let method = Method::new("counter", "memory.n := memory.n + 1", "1.0.0", &log).unwrap();
        assert_eq!(method.name(), "counter");
        assert_eq!(method.version(), "1.0.0");
        assert_eq!(method.ast().unwrap().len(), 1);
        assert!(!log.has_errors());
    }

    #[test]
    fn test_bad_source_still_creates_method() {
        let log = Log::new();
        let method = Method::new("broken", "this is not an instruction", "1.0.0", &log).unwrap();
        assert!(method.ast().is_none());
        assert_eq!(method.source(), "this is not an instruction");
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::Parse);
    }

    #[test]
    fn test_empty_name_rejected() {
        let log = Log::new();
        let err = Method::new("", "memory.x := 1", "1.0.0", &log).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_empty_version_rejected() {
        let log = Log::new();
        assert!(Method::new("m", "memory.x := 1", "", &log).is_err());
    }
}
