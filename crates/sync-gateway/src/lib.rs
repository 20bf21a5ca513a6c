//! # Sync Gateway
//!
//! The authorization-aware core of MirrorSync: named **publications**
//! (incremental read views) and **methods** (mutations with tagged
//! results) over a narrow document-store port.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        SYNC GATEWAY                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │  POST /api/sync                                                │
//! │        │                                                       │
//! │  ┌─────┴──────┐      identity       ┌────────────────────┐     │
//! │  │  Service   │──AuthResolver──────→│ Registry           │     │
//! │  └─────┬──────┘   (bounded timeout) │  name → Handler    │     │
//! │        │                            │  (pub | method)    │     │
//! │        │                            └──────┬─────────────┘     │
//! │        ▼                                   ▼                   │
//! │  ┌────────────┐  watermark filter   ┌────────────────────┐     │
//! │  │ Delta      │──────redact────────→│ Method Dispatcher  │     │
//! │  │ Engine     │                     │  (credit txn, ...) │     │
//! │  └─────┬──────┘                     └──────┬─────────────┘     │
//! └────────┼───────────────────────────────────┼───────────────────┘
//!          ▼                                   ▼
//!               DocumentStore port (the only shared state)
//! ```
//!
//! # Guarantees
//!
//! - **Fail-soft subscriptions**: an unauthorized or unknown subscription
//!   is indistinguishable from an empty result set; authorization never
//!   leaks through an error channel.
//! - **Mandatory redaction**: every published document passes the field
//!   redactor, regardless of which publication produced it.
//! - **Watermark deltas**: only entries whose revision marker is strictly
//!   greater than the caller's watermark are transmitted.
//! - **Transactional redemption**: the credit-code method never violates
//!   `used <= total`, even with many gateway instances racing on one code,
//!   because every contended write is a store-level conditional update.

pub mod adapters;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod methods;
pub mod ports;
pub mod publications;
pub mod registry;
pub mod service;

pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{DomainCode, GatewayError};
pub use domain::redact::Redactor;
pub use domain::types::{ChangeGroup, MethodOutcome, PublicationOutput};
pub use engine::SyncGateway;
pub use ports::{AuthError, AuthResolver, RequestCredentials};
pub use registry::{MethodCx, PublicationCx, Registry};
pub use service::{router, AppState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
