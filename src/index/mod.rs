//! Indexed document store used to persist rankings and average ranks.
//!
//! The store is organised in named cores (partitions). Each core accepts
//! document upserts and deletions which only become visible to queries after
//! a `commit`. Queries are an AND of exact-match filters, sorted on a single
//! field and paginated with `start`/`rows`; `rows == 0` only counts matches.
//!
//! ## Example
//!
//! ```ignore
//! use ranking_rust::index::{Document, IndexCore, IndexProvider, IndexQuery, InMemoryIndex};
//!
//! let index = InMemoryIndex::new();
//! let core = index.core("ranking")?;
//! core.add(Document::new("r1").with("vote", 4))?;
//! core.commit()?;
//! let response = core.query(&IndexQuery::new().filter("vote", 4))?;
//! assert_eq!(response.num_found, 1);
//! ```

mod in_memory;
mod query;
mod store;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error type for index store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
    /// A lock guarding the store was poisoned.
    LockPoisoned(&'static str),
    /// The requested core does not exist and cannot be created.
    UnknownCore(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::Serde(msg) => write!(f, "index serialization error: {}", msg),
            IndexError::Storage(msg) => write!(f, "index storage error: {}", msg),
            IndexError::LockPoisoned(operation) => {
                write!(f, "index lock poisoned during {}", operation)
            }
            IndexError::UnknownCore(name) => write!(f, "unknown index core: {}", name),
        }
    }
}

impl std::error::Error for IndexError {}

/// A stored field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Double(f64),
    /// Milliseconds since the Unix epoch.
    Date(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Double(value) => Some(*value),
            FieldValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<i64> {
        match self {
            FieldValue::Date(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

/// A document of the index: an identifier plus named fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

pub use in_memory::{InMemoryCore, InMemoryIndex};
pub use query::{IndexQuery, QueryResponse, SortOrder, ID_FIELD};
pub use store::{IndexCore, IndexProvider};
