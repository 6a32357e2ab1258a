//! Runtime error taxonomy
//!
//! Every failure the runtime can surface is classified by an [`ErrorKind`].
//! Errors never propagate into the host: they are recovered at the
//! instruction boundary and recorded on the [`Log`](crate::log::Log). The
//! structured record type is [`RuntimeError`].

use thiserror::Error;

/// Classification of runtime failures.
///
/// The kinds form the contract between the runtime and its diagnostics:
/// tests assert on them and hosts may filter log records by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Malformed expression or instruction source.
    #[error("parse error")]
    Parse,
    /// An accessor descended into a missing or non-map node.
    #[error("path unresolved")]
    PathUnresolved,
    /// Arithmetic or coercion on incompatible value variants.
    #[error("type mismatch")]
    TypeMismatch,
    #[error("division by zero")]
    DivisionByZero,
    /// Assignment targeting `context` or `message`.
    #[error("assignment target forbidden")]
    AssignTargetForbidden,
    /// Attempted shallow copy of a list or map.
    #[error("container copy")]
    ContainerCopy,
    /// A send or destroy targeted an id no agent holds.
    #[error("unknown agent")]
    UnknownAgent,
    /// A spawn or compile referenced an unregistered (name, version).
    #[error("unknown method")]
    UnknownMethod,
    /// A compile collided with an already-registered (name, version).
    #[error("version conflict")]
    VersionConflict,
    /// File I/O or schema validation failure in a store.
    #[error("persistence error")]
    Persistence,
    /// Agency or system construction failure.
    #[error("bootstrap failure")]
    Bootstrap,
}

/// A structured error record.
///
/// Carries the classification, a human-readable message, and - for parse
/// errors - the 1-based source line the failure was detected on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// 1-based source line, when the error originates from method source.
    pub line: Option<u32>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    /// Attach a 1-based source line to the record.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}
