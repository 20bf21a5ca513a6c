//! Primary port: the Document Store contract consumed by the gateway.

use async_trait::async_trait;

use sync_types::{fields, Document};

use crate::domain::{Filter, StoreError, UpdateOps};

/// Outcome of a conditional update: how many documents matched the filter
/// and how many were actually modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    /// True when the conditional filter matched nothing — the signal the
    /// redemption transaction branches on.
    pub fn missed(&self) -> bool {
        self.matched == 0
    }
}

/// Keep-list projection applied to scan results. `_id` and `__updatedAt`
/// always survive so the client can apply and watermark the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn apply(&self, doc: &Document) -> Document {
        let mut projected = Document::new();
        for (key, value) in &doc.0 {
            if key == fields::ID
                || key == fields::UPDATED_AT
                || self.fields.iter().any(|f| f == key)
            {
                projected.set(key.clone(), value.clone());
            }
        }
        projected
    }
}

/// The narrow contract the sync core requires from the underlying document
/// store. Point lookups, filtered scans, and conditional single-document
/// updates; transactional semantics live entirely behind `update_one`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// First document matching the filter, if any.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// All documents matching the filter, optionally projected.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<&Projection>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Applies the operators to at most one document matching the filter.
    /// The filter is evaluated atomically with the write: a caller that
    /// conditions on current field values gets compare-and-update
    /// semantics, not read-then-write.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        ops: &UpdateOps,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Inserts a new document. A missing `_id` is generated; a duplicate
    /// `_id` is rejected.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String, StoreError>;
}
