//! Update operators.
//!
//! An `UpdateOps` bundle is applied to one matched document inside the
//! adapter's critical section. Application is all-or-nothing from the
//! caller's point of view: the adapter only stamps a new revision when at
//! least one operator changed the document.

use serde_json::{Map, Value};

use sync_types::Document;

use super::errors::StoreError;

/// One mutation of a document field. Paths are dotted; intermediate
/// objects are created on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Numeric increment; a missing field starts at zero.
    Inc(String, i64),
    /// Overwrite (or create) the field.
    Set(String, Value),
    /// Append to an array field unless the value is already present.
    AddToSet(String, Value),
    /// Remove every occurrence of the value from an array field.
    Pull(String, Value),
}

/// Ordered list of update operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOps {
    ops: Vec<UpdateOp>,
}

impl UpdateOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(mut self, path: impl Into<String>, delta: i64) -> Self {
        self.ops.push(UpdateOp::Inc(path.into(), delta));
        self
    }

    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Set(path.into(), value.into()));
        self
    }

    pub fn add_to_set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::AddToSet(path.into(), value.into()));
        self
    }

    pub fn pull(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Pull(path.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Applies every operator to the document. Returns whether anything
    /// actually changed, so the adapter can decide about revision stamping.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, StoreError> {
        let mut modified = false;
        for op in &self.ops {
            modified |= op.apply(&mut doc.0)?;
        }
        Ok(modified)
    }
}

impl UpdateOp {
    fn apply(&self, map: &mut Map<String, Value>) -> Result<bool, StoreError> {
        match self {
            UpdateOp::Inc(path, delta) => {
                let slot = slot_mut(map, path)?;
                let current = match slot {
                    Value::Null => 0,
                    ref other => other.as_i64().ok_or_else(|| {
                        StoreError::InvalidDocument(format!("{path} is not an integer"))
                    })?,
                };
                *slot = Value::from(current + delta);
                Ok(true)
            }
            UpdateOp::Set(path, value) => {
                let slot = slot_mut(map, path)?;
                let changed = slot != value;
                *slot = value.clone();
                Ok(changed)
            }
            UpdateOp::AddToSet(path, value) => {
                let slot = slot_mut(map, path)?;
                if slot.is_null() {
                    *slot = Value::Array(Vec::new());
                }
                let arr = slot.as_array_mut().ok_or_else(|| {
                    StoreError::InvalidDocument(format!("{path} is not an array"))
                })?;
                if arr.contains(value) {
                    Ok(false)
                } else {
                    arr.push(value.clone());
                    Ok(true)
                }
            }
            UpdateOp::Pull(path, value) => {
                // Absent field: nothing to pull, and no slot is materialized.
                if slot_ref(map, path).is_none() {
                    return Ok(false);
                }
                let slot = slot_mut(map, path)?;
                let arr = slot.as_array_mut().ok_or_else(|| {
                    StoreError::InvalidDocument(format!("{path} is not an array"))
                })?;
                let before = arr.len();
                arr.retain(|v| v != value);
                Ok(arr.len() != before)
            }
        }
    }
}

/// Read-only slot lookup for a dotted path.
fn slot_ref<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => map.get(path),
        Some((head, rest)) => slot_ref(map.get(head)?.as_object()?, rest),
    }
}

/// Mutable slot for a dotted path, creating intermediate objects. A missing
/// leaf is materialized as `Null` so operators can decide its meaning.
fn slot_mut<'a>(map: &'a mut Map<String, Value>, path: &str) -> Result<&'a mut Value, StoreError> {
    match path.split_once('.') {
        None => Ok(map.entry(path.to_string()).or_insert(Value::Null)),
        Some((head, rest)) => {
            let next = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match next {
                Value::Object(inner) => slot_mut(inner, rest),
                _ => Err(StoreError::InvalidDocument(format!(
                    "{head} is not an object"
                ))),
            }
        }
    }
}
