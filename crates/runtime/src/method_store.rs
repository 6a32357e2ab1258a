//! Methodology persistence: the line-based catalog file
//!
//! Format:
//!
//! ```text
//! <N>                  number of distinct method names
//! <name> <V>           name token and its version count
//! <version>            semver string
//! <source>             source text, one line
//! ...
//! ```
//!
//! Sources are stored on a single line with `\n`, `\r`, and `\\` escaped;
//! load reverses the escaping. A corrupt file is backed up and replaced
//! with an empty catalog so the runtime always comes up.

use crate::method::Method;
use crate::method_registry::MethodRegistry;
use crate::persist;
use agerun_core::{ErrorKind, Log, RuntimeError};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug)]
pub struct MethodStore {
    path: PathBuf,
}

impl MethodStore {
    pub fn new(path: impl Into<PathBuf>) -> MethodStore {
        MethodStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the store file, keeping a backup.
    pub fn delete(&self) -> bool {
        if !self.exists() {
            return true;
        }
        let _ = persist::create_backup(&self.path);
        fs::remove_file(&self.path).is_ok()
    }

    /// Serialize the registry to disk. Returns false (with a log record)
    /// on any I/O failure.
    pub fn save(&self, log: &Log, registry: &MethodRegistry) -> bool {
        let mut out = String::new();
        out.push_str(&registry.name_count().to_string());
        out.push('\n');
        for name in registry.names() {
            let versions = registry.versions_of(name);
            out.push_str(&format!("{} {}\n", name, versions.len()));
            for method in versions {
                out.push_str(method.version());
                out.push('\n');
                out.push_str(&escape_source(method.source()));
                out.push('\n');
            }
        }

        if let Err(err) = persist::create_backup(&self.path) {
            log.error(
                ErrorKind::Persistence,
                format!("cannot back up {}: {}", self.path.display(), err),
            );
            return false;
        }
        if let Err(err) = persist::atomic_write(&self.path, &out) {
            log.error(
                ErrorKind::Persistence,
                format!("cannot write {}: {}", self.path.display(), err),
            );
            return false;
        }
        true
    }

    /// Populate the registry from disk.
    ///
    /// A missing file is fine (nothing to load). A corrupt file is backed
    /// up, the registry is cleared, a `PersistenceError` is recorded, and
    /// the call reports failure - the runtime continues with an empty
    /// catalog.
    pub fn load(&self, log: &Log, registry: &mut MethodRegistry) -> bool {
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

        match parse_catalog(&contents, log) {
            Ok(methods) => {
                for method in methods {
                    // Duplicates inside one file are a corruption symptom;
                    // keep the first occurrence and report the rest.
                    if let Err(err) = registry.register(method) {
                        log.report(err);
                    }
                }
                true
            }
            Err(err) => {
                log.report(err);
                let _ = persist::create_backup(&self.path);
                let _ = persist::atomic_write(&self.path, "0\n");
                registry.clear();
                false
            }
        }
    }
}

fn escape_source(source: &str) -> String {
    let mut escaped = String::with_capacity(source.len());
    for c in source.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_source(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn corrupt(message: impl Into<String>) -> RuntimeError {
    RuntimeError::new(ErrorKind::Persistence, message)
}

fn parse_catalog(contents: &str, log: &Log) -> Result<Vec<Rc<Method>>, RuntimeError> {
    let mut lines = contents.lines();
    let name_count: usize = lines
        .next()
        .ok_or_else(|| corrupt("catalog is empty"))?
        .trim()
        .parse()
        .map_err(|_| corrupt("catalog header is not a count"))?;

    let mut methods = Vec::new();
    for _ in 0..name_count {
        let header = lines
            .next()
            .ok_or_else(|| corrupt("truncated catalog: missing name header"))?;
        let mut parts = header.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| corrupt("empty name header"))?
            .to_string();
        let version_count: usize = parts
            .next()
            .ok_or_else(|| corrupt(format!("missing version count for '{}'", name)))?
            .parse()
            .map_err(|_| corrupt(format!("bad version count for '{}'", name)))?;
        if parts.next().is_some() {
            return Err(corrupt(format!("trailing tokens after '{}' header", name)));
        }

        for _ in 0..version_count {
            let version = lines
                .next()
                .ok_or_else(|| corrupt(format!("truncated catalog: missing version of '{}'", name)))?
                .trim()
                .to_string();
            let source_line = lines
                .next()
                .ok_or_else(|| corrupt(format!("truncated catalog: missing source of '{}'", name)))?;
            let source = unescape_source(source_line);
            let method = Method::new(name.clone(), source, version, log)
                .map_err(|err| corrupt(format!("invalid method record: {}", err)))?;
            methods.push(Rc::new(method));
        }
    }
    Ok(methods)
}
