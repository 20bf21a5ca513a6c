//! Document filters.
//!
//! A `Filter` is a conjunction of conditions evaluated against one
//! document. `LtField` compares two fields of the same document, which is
//! what makes "increment `used` only while `used < total`" expressible as
//! a single conditional update.

use serde_json::Value;
use std::cmp::Ordering;

use sync_types::{fields, Document};

/// One condition over a document field. Paths are dotted (`credits.free`).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals value. A missing field never matches.
    Eq(String, Value),
    /// Field differs from value. A missing field matches.
    Ne(String, Value),
    /// Field strictly greater than value (numeric or string order).
    Gt(String, Value),
    /// Field strictly less than value.
    Lt(String, Value),
    /// Left field strictly less than right field of the same document.
    LtField(String, String),
    /// Array field contains the value.
    Contains(String, Value),
    /// Array field does not contain the value; a missing field matches.
    NotContains(String, Value),
}

impl Condition {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq(path, value) => doc.lookup(path) == Some(value),
            Condition::Ne(path, value) => doc.lookup(path) != Some(value),
            Condition::Gt(path, value) => {
                compare(doc.lookup(path), Some(value)) == Some(Ordering::Greater)
            }
            Condition::Lt(path, value) => {
                compare(doc.lookup(path), Some(value)) == Some(Ordering::Less)
            }
            Condition::LtField(left, right) => {
                compare(doc.lookup(left), doc.lookup(right)) == Some(Ordering::Less)
            }
            Condition::Contains(path, value) => doc.contains_in_array(path, value),
            Condition::NotContains(path, value) => !doc.contains_in_array(path, value),
        }
    }
}

/// Ordered comparison of two JSON values. Mixed or non-orderable types
/// yield `None`, which makes the condition fail rather than guess.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    match (a?, b?) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64().zip(y.as_f64()).and_then(|(x, y)| x.partial_cmp(&y))
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Conjunction of conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match by `_id`.
    pub fn id(value: impl Into<String>) -> Self {
        Self::new().eq(fields::ID, Value::String(value.into()))
    }

    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(path.into(), value.into()));
        self
    }

    pub fn ne(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(path.into(), value.into()));
        self
    }

    pub fn gt(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Gt(path.into(), value.into()));
        self
    }

    pub fn lt(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Lt(path.into(), value.into()));
        self
    }

    pub fn lt_field(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::LtField(left.into(), right.into()));
        self
    }

    pub fn contains(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Contains(path.into(), value.into()));
        self
    }

    pub fn not_contains(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::NotContains(path.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
