//! Input shapes accepted by `filter` and `or`.
//!
//! A [`Condition`] is resolved once, at the call boundary, into an ordered
//! list of [`Clause`]s:
//!
//! ```rust
//! use elasto_query::{Clause, Condition};
//! use serde_json::json;
//!
//! let clauses = Condition::from(("tag", json!(["a", "b"]))).into_clauses().unwrap();
//! assert!(matches!(clauses[0], Clause::Terms { .. }));
//!
//! let clauses = Condition::from(json!({"published": true, "category": "abc"}))
//!     .into_clauses()
//!     .unwrap();
//! assert_eq!(clauses.len(), 2);
//! ```

use elasto_core::{Error, Result};
use serde_json::{Map, Value};

use crate::clause::Clause;

/// One field/value pair, a field→value mapping, or a list of mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A single field and its value.
    Pair(String, Value),
    /// One clause per entry.
    Map(Map<String, Value>),
    /// Each mapping expanded in turn; all clauses are conjunctive.
    List(Vec<Map<String, Value>>),
    /// Input that cannot be turned into clauses.
    Invalid(String),
}

impl Condition {
    /// Expand into clauses in enumeration order.
    ///
    /// Array values become `Terms` clauses; everything else becomes `Term`.
    pub fn into_clauses(self) -> Result<Vec<Clause>> {
        match self {
            Condition::Pair(field, value) => {
                if field.is_empty() {
                    return Err(Error::validation("condition field name must not be empty"));
                }
                Ok(vec![Clause::matching(field, value)])
            }
            Condition::Map(map) => Ok(expand(map)),
            Condition::List(maps) => Ok(maps.into_iter().flat_map(expand).collect()),
            Condition::Invalid(message) => Err(Error::validation(message)),
        }
    }
}

fn expand(map: Map<String, Value>) -> Vec<Clause> {
    map.into_iter()
        .map(|(field, value)| Clause::matching(field, value))
        .collect()
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Condition {
    fn from((field, value): (K, V)) -> Self {
        Condition::Pair(field.into(), value.into())
    }
}

impl From<Map<String, Value>> for Condition {
    fn from(map: Map<String, Value>) -> Self {
        Condition::Map(map)
    }
}

impl From<Vec<Map<String, Value>>> for Condition {
    fn from(maps: Vec<Map<String, Value>>) -> Self {
        Condition::List(maps)
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Condition::Map(map),
            Value::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(map) => maps.push(map),
                        other => {
                            return Condition::Invalid(format!(
                                "condition list entries must be objects, got {other}"
                            ))
                        }
                    }
                }
                Condition::List(maps)
            }
            other => Condition::Invalid(format!(
                "condition must be an object or a list of objects, got {other}"
            )),
        }
    }
}
