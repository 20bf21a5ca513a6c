//! Store domain logic: filters, update operators, errors.
//!
//! Filter matching and operator application are pure functions over
//! documents; adapters supply the locking and revision stamping around them.

pub mod errors;
pub mod filter;
pub mod update;

pub use errors::StoreError;
pub use filter::{Condition, Filter};
pub use update::{UpdateOp, UpdateOps};
