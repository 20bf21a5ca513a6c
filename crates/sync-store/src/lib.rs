//! # sync-store
//!
//! Document Store port and adapters for MirrorSync.
//!
//! ## Role in System
//!
//! The store is the only shared mutable resource in the system. The gateway
//! holds no cross-request state; every cross-field invariant (redemption
//! quota cap, at-most-once redemption per user) is enforced here through
//! atomic conditional updates, never through in-process locks — multiple
//! gateway instances may run concurrently behind the same store.
//!
//! ## Contract
//!
//! - `find_one` / `find`: point lookups and filtered scans.
//! - `update_one`: matches at most one document and applies all update
//!   operators to it atomically. The filter is re-evaluated inside the
//!   store's own critical section, so "increment only if `used < total`"
//!   is a single conditional write, not a read followed by a write.
//! - Every successful write stamps `__updatedAt` with a monotonically
//!   increasing revision.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::MemoryStore;
pub use domain::{Condition, Filter, StoreError, UpdateOps};
pub use ports::{DocumentStore, Projection, UpdateOutcome};
