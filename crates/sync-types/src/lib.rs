//! # Sync Types Crate
//!
//! Core domain entities for MirrorSync, shared by the store and the gateway.
//!
//! ## Clusters
//!
//! - **Callers**: `Identity`, `UserId`
//! - **Data**: `Document`, `Revision`, `WatermarkMap`
//! - **Credits**: `CreditCode` and the user credit field layout
//!
//! ## Design Principles
//!
//! - **Documents are JSON**: a `Document` is a JSON object with a required
//!   `_id` field and a store-stamped `__updatedAt` revision marker. Schema is
//!   by convention, not enforced structurally.
//! - **Anonymous is not an error**: `Identity::Anonymous` is a valid,
//!   low-privilege caller. Handlers branch on it; they never fail because
//!   of it.

pub mod credit;
pub mod entities;
pub mod errors;

pub use credit::CreditCode;
pub use entities::{Document, Identity, Revision, UserId, WatermarkMap};
pub use errors::EntityError;

/// Well-known document field names.
pub mod fields {
    /// Unique document identifier, required on every document.
    pub const ID: &str = "_id";
    /// Revision marker, stamped by the store on every write.
    pub const UPDATED_AT: &str = "__updatedAt";
    /// Owner reference on user-scoped documents.
    pub const USER_ID: &str = "userId";
    /// Administrator flag on user documents.
    pub const ADMIN: &str = "admin";
    /// Credit-code names a user has already redeemed.
    pub const REDEEMED_CODES: &str = "redeemedCreditCodes";
    /// Free (promotional) credit balance, nested under `credits`.
    pub const CREDITS_FREE: &str = "credits.free";
    /// Unique credit-code name.
    pub const CODE_NAME: &str = "name";
    /// Credits granted per redemption of a code.
    pub const CODE_CREDITS: &str = "credits";
    /// Times a code has been redeemed so far.
    pub const CODE_USED: &str = "used";
    /// Global redemption quota for a code.
    pub const CODE_TOTAL: &str = "total";
}

/// Well-known collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const CREDIT_CODES: &str = "creditCodes";
    pub const ACCOUNTS: &str = "accounts";
    pub const ORDERS: &str = "orders";
}
