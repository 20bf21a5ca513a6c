//! # Core Domain Entities
//!
//! Identities, documents, revision markers and watermark maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::fields;

// =============================================================================
// CALLERS
// =============================================================================

/// Opaque, stable identifier for an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The caller of a subscription or method.
///
/// `Anonymous` is a distinguished low-privilege identity, not an error:
/// publications degrade to empty results for it, and only methods that
/// require an authenticated caller reject it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Anonymous,
    User(UserId),
}

impl Identity {
    pub fn user(id: impl Into<UserId>) -> Self {
        Identity::User(id.into())
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// The authenticated user id, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(id),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Anonymous => f.write_str("anonymous"),
            Identity::User(id) => f.write_str(id.as_str()),
        }
    }
}

// =============================================================================
// DATA
// =============================================================================

/// Monotonically increasing revision marker, stamped by the store on every
/// document write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(pub u64);

impl Revision {
    /// "Client has nothing cached" — every stored revision is greater.
    pub const ZERO: Revision = Revision(0);

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Revision {
    fn from(v: u64) -> Self {
        Revision(v)
    }
}

/// A document: a JSON object with a required `_id` and a store-stamped
/// `__updatedAt` revision marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(pub Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a document from any JSON value; non-objects are rejected by
    /// the store at insert time via `EntityError`, so this only accepts maps.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(fields::ID).and_then(Value::as_str)
    }

    /// The store-stamped revision marker; `Revision::ZERO` when the document
    /// has never been written (never the case for stored documents).
    pub fn revision(&self) -> Revision {
        self.0
            .get(fields::UPDATED_AT)
            .and_then(Value::as_u64)
            .map(Revision)
            .unwrap_or(Revision::ZERO)
    }

    /// Field lookup with dotted-path traversal (`credits.free`).
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current: &Value = self.0.get(path.split('.').next()?)?;
        for part in path.split('.').skip(1) {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn str_field(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    pub fn i64_field(&self, path: &str) -> Option<i64> {
        self.lookup(path).and_then(Value::as_i64)
    }

    pub fn bool_field(&self, path: &str) -> Option<bool> {
        self.lookup(path).and_then(Value::as_bool)
    }

    /// True when `path` holds an array containing `value`.
    pub fn contains_in_array(&self, path: &str, value: &Value) -> bool {
        self.lookup(path)
            .and_then(Value::as_array)
            .is_some_and(|arr| arr.contains(value))
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Per-collection watermarks supplied by the caller on each subscription
/// request: the highest revision marker the client has already received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatermarkMap(pub HashMap<String, Revision>);

impl WatermarkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent entries mean "client has nothing cached".
    pub fn for_collection(&self, collection: &str) -> Revision {
        self.0.get(collection).copied().unwrap_or(Revision::ZERO)
    }

    pub fn set(&mut self, collection: impl Into<String>, revision: Revision) {
        self.0.insert(collection.into(), revision);
    }
}
