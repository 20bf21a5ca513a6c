use thiserror::Error;

/// Errors surfaced by the Document Store port.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A store-internal lock was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,

    /// Document rejected at insert: duplicate `_id` within the collection.
    #[error("Duplicate _id in collection {collection}: {id}")]
    DuplicateId { collection: String, id: String },

    /// A document or update operator did not have a usable shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Backend failure (I/O, connection, driver).
    #[error("Store backend error: {0}")]
    Backend(String),
}
