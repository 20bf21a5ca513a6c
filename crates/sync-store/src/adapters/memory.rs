//! In-memory `DocumentStore` used by the node runtime and the test suite.
//!
//! All writes go through one `RwLock` over the collection map, which gives
//! `update_one` its required atomicity: the filter is re-evaluated and the
//! operators applied under the same write guard. The revision clock is a
//! process-wide `AtomicU64` ticked inside that guard, so revisions are
//! strictly increasing in write order.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use async_trait::async_trait;
use sync_types::{fields, Document};

use crate::domain::{Filter, StoreError, UpdateOps};
use crate::ports::{DocumentStore, Projection, UpdateOutcome};

type Collections = HashMap<String, HashMap<String, Document>>;

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    clock: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next revision tick. Only called while holding the write lock, so
    /// stamped revisions are strictly increasing across all collections.
    fn next_revision(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current revision high-water mark (test support).
    pub fn current_revision(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.values().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<&Projection>,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .values()
            .filter(|d| filter.matches(d))
            .map(|d| match projection {
                Some(p) => p.apply(d),
                None => d.clone(),
            })
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        ops: &UpdateOps,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut guard = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };
        let Some(doc) = docs.values_mut().find(|d| filter.matches(d)) else {
            return Ok(UpdateOutcome::default());
        };

        let modified = ops.apply(doc)?;
        if modified {
            doc.set(fields::UPDATED_AT, Value::from(self.next_revision()));
        }
        Ok(UpdateOutcome {
            matched: 1,
            modified: modified as u64,
        })
    }

    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = match doc.id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                doc.set(fields::ID, Value::String(id.clone()));
                id
            }
        };

        let mut guard = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id,
            });
        }
        doc.set(fields::UPDATED_AT, Value::from(self.next_revision()));
        docs.insert(id.clone(), doc);
        Ok(id)
    }
}
