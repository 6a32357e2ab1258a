//! Value: what agents talk about
//!
//! The universal datum flowing through the runtime - messages, agent
//! memory, and spawn contexts are all [`Value`]s. A value is pure data:
//! scalars, strings, and containers of further values.
//!
//! # Ownership
//!
//! The runtime's ownership discipline maps onto Rust move semantics:
//! claiming a value is moving it, releasing is dropping or handing it back,
//! and a container owns everything inside it. Two rules are preserved as
//! observable semantics rather than leaning on the borrow checker:
//!
//! - [`Value::shallow_copy`] duplicates scalars and strings only. There is
//!   NO deep copy: copying a list or map fails with `ContainerCopy`, and
//!   callers must fail gracefully.
//! - Evaluators that may return either a borrowed reference (a bare path)
//!   or a freshly computed value express that with [`Evaluated`];
//!   [`Evaluated::into_owned`] is the claim-or-copy idiom.
//!
//! `Value` deliberately does not implement `Clone` so that the only
//! duplication paths are the explicit ones above.

use crate::error::{ErrorKind, RuntimeError};
use std::collections::BTreeMap;

/// Map payload: string keys to values.
///
/// `BTreeMap` keeps serialization deterministic (the same logical map
/// always persists to identical bytes); entry order is not observable to
/// method code.
pub type Map = BTreeMap<String, Value>;

/// Tagged union of every datum the method language can touch.
#[derive(Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Fresh empty map value.
    pub fn empty_map() -> Value {
        Value::Map(Map::new())
    }

    /// Fresh empty list value.
    pub fn empty_list() -> Value {
        Value::List(Vec::new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Truthiness for the `if` instruction: non-zero numbers and non-empty
    /// strings are truthy; containers are not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Double(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => false,
        }
    }

    /// Duplicate a scalar or string value.
    ///
    /// Containers cannot be duplicated - the runtime has no deep copy, and
    /// a shallow copy of a container would alias owned children.
    pub fn shallow_copy(&self) -> Result<Value, RuntimeError> {
        match self {
            Value::Integer(n) => Ok(Value::Integer(*n)),
            Value::Double(d) => Ok(Value::Double(*d)),
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::List(_) | Value::Map(_) => Err(RuntimeError::new(
                ErrorKind::ContainerCopy,
                format!("cannot shallow-copy a {}", self.type_name()),
            )),
        }
    }

    /// Canonical decimal text of a scalar, used by string concatenation and
    /// `build` substitution. Containers have no canonical text.
    ///
    /// Doubles always render with a decimal point or exponent so that the
    /// text re-parses as a double.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            Value::Integer(n) => Some(n.to_string()),
            Value::Double(d) => Some(format_double(*d)),
            Value::String(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Value {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

fn format_double(d: f64) -> String {
    let text = format!("{}", d);
    if text.contains(['.', 'e', 'E']) || d.is_nan() || d.is_infinite() {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Result of evaluating an expression: a borrowed reference into the frame
/// (bare paths) or a freshly computed value (everything else).
#[derive(Debug)]
pub enum Evaluated<'a> {
    Borrowed(&'a Value),
    Computed(Value),
}

impl<'a> Evaluated<'a> {
    /// View the result without taking ownership.
    pub fn as_value(&self) -> &Value {
        match self {
            Evaluated::Borrowed(v) => v,
            Evaluated::Computed(v) => v,
        }
    }

    /// Claim-or-copy: take the computed value, or shallow-copy the borrow.
    ///
    /// Fails with `ContainerCopy` when the borrow is a list or map.
    pub fn into_owned(self) -> Result<Value, RuntimeError> {
        match self {
            Evaluated::Computed(v) => Ok(v),
            Evaluated::Borrowed(v) => v.shallow_copy(),
        }
    }
}

/// Resolve a dotted path inside a map, descending only through maps.
pub fn map_get_path<'a>(map: &'a Map, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = map.get(first)?;
    for segment in rest {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

/// Store a value at a dotted path inside a map.
///
/// Missing intermediate nodes are created as empty maps; an existing
/// non-map intermediate is never overwritten.
pub fn map_set_path(map: &mut Map, segments: &[String], value: Value) -> Result<(), RuntimeError> {
    let Some((leaf, intermediates)) = segments.split_last() else {
        return Err(RuntimeError::new(
            ErrorKind::PathUnresolved,
            "empty assignment path",
        ));
    };

    let mut current = map;
    for segment in intermediates {
        let node = current
            .entry(segment.clone())
            .or_insert_with(Value::empty_map);
        current = node.as_map_mut().ok_or_else(|| {
            RuntimeError::new(
                ErrorKind::PathUnresolved,
                format!("path segment '{}' is not a map", segment),
            )
        })?;
    }
    current.insert(leaf.clone(), value);
    Ok(())
}
