//! Append-only diagnostic sink
//!
//! Every recoverable runtime failure lands here as a structured
//! [`RuntimeError`] record. The log is shared across the system (agency,
//! interpreter, evaluators, stores) behind an `Rc`, and the runtime is
//! single-threaded, so interior mutability is a plain `RefCell`.
//!
//! Records are also mirrored onto the `tracing` ecosystem so a host that
//! installs a subscriber sees diagnostics without polling the log.

use crate::error::{ErrorKind, RuntimeError};
use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct Log {
    records: RefCell<Vec<RuntimeError>>,
}

impl Log {
    pub fn new() -> Log {
        Log::default()
    }

    /// Append one structured record.
    pub fn report(&self, error: RuntimeError) {
        match error.line {
            Some(line) => {
                tracing::error!(kind = %error.kind, line, "{}", error.message);
            }
            None => {
                tracing::error!(kind = %error.kind, "{}", error.message);
            }
        }
        self.records.borrow_mut().push(error);
    }

    /// Convenience for a record without a source line.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) {
        self.report(RuntimeError::new(kind, message));
    }

    pub fn error_count(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn has_errors(&self) -> bool {
        !self.records.borrow().is_empty()
    }

    /// The most recent record, if any.
    pub fn last_error(&self) -> Option<RuntimeError> {
        self.records.borrow().last().cloned()
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<RuntimeError> {
        self.records.borrow().clone()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_and_snapshot() {
        let log = Log::new();
        assert!(!log.has_errors());

        log.error(ErrorKind::DivisionByZero, "1 / 0");
        log.report(RuntimeError::new(ErrorKind::Parse, "bad line").with_line(3));

        assert_eq!(log.error_count(), 2);
        let records = log.records();
        assert_eq!(records[0].kind, ErrorKind::DivisionByZero);
        assert_eq!(records[1].kind, ErrorKind::Parse);
        assert_eq!(records[1].line, Some(3));
        assert_eq!(log.last_error().unwrap().kind, ErrorKind::Parse);
    }

    #[test]
    fn test_clear() {
        let log = Log::new();
        log.error(ErrorKind::UnknownAgent, "no agent 9");
        log.clear();
        assert_eq!(log.error_count(), 0);
        assert!(log.last_error().is_none());
    }
}
