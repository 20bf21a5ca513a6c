//! Store adapters. Only the in-memory adapter ships with the core; a
//! production deployment supplies its own `DocumentStore` implementation.

pub mod memory;

pub use memory::MemoryStore;
