//! # MirrorSync Test Suite
//!
//! Unified test crate exercising the gateway end to end: subscriptions
//! through the delta engine, the credit-redemption transaction under
//! contention, and the HTTP surface.
//!
//! ## Structure
//!
//! ```text
//! tests/src/integration/
//! ├── subscriptions.rs  # Publications, watermarks, redaction, auth gating
//! ├── redemption.rs     # Credit-code transaction: idempotency and quota
//! └── http.rs           # POST /api/sync end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sync-tests
//!
//! # By category
//! cargo test -p sync-tests integration::redemption::
//! ```

#![allow(dead_code)]

pub mod integration;
