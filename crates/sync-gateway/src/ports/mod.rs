//! Outbound port: identity resolution.
//!
//! The resolver turns request credentials into a stable identity. Absence
//! of credentials is `Identity::Anonymous`, never an error; only backend
//! failures are errors. Every call is wrapped in a bounded timeout by the
//! dispatcher — a hung resolver becomes a fatal failure, not a stuck
//! request.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use sync_types::Identity;

/// Credentials carried by a sync request. Transport-agnostic: the service
/// layer fills this from whatever the framing provides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestCredentials {
    pub token: Option<String>,
}

impl RequestCredentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Resolver backend failure. "Not logged in" is not a failure.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Auth backend error: {0}")]
    Backend(String),
}

/// Identity Resolver contract.
#[async_trait]
pub trait AuthResolver: Send + Sync {
    async fn resolve(&self, credentials: &RequestCredentials) -> Result<Identity, AuthError>;
}
