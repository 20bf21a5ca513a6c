//! Gateway error taxonomy.
//!
//! Two distinct kinds:
//!
//! - **Fatal/protocol errors** (`GatewayError`): unauthenticated call to an
//!   identity-requiring method, unknown method name, resolver timeout,
//!   store failure. Propagated to the caller as hard failures.
//! - **Domain errors** (`DomainCode`): expected, data-shaped outcomes of a
//!   well-formed request. Returned inside `MethodOutcome::Error`, never
//!   thrown; callers branch on them.
//!
//! Authorization gaps in publications are neither: they degrade to empty
//! result sets and produce no error at all.

use thiserror::Error;

use sync_store::StoreError;

use crate::ports::AuthError;

/// Expected, data-shaped failure of a well-formed method call. Wire form
/// is `{"$error": "<CODE>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainCode {
    /// The caller already redeemed this code.
    AlreadyRedeemed,
    /// No code with the given name exists.
    NoSuchCode,
    /// The code's global redemption quota is exhausted.
    MaximumReached,
}

impl DomainCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainCode::AlreadyRedeemed => "ALREADY_REDEEMED",
            DomainCode::NoSuchCode => "NO_SUCH_CODE",
            DomainCode::MaximumReached => "MAXIMUM_REACHED",
        }
    }

    pub fn from_wire(code: &str) -> Option<Self> {
        match code {
            "ALREADY_REDEEMED" => Some(DomainCode::AlreadyRedeemed),
            "NO_SUCH_CODE" => Some(DomainCode::NoSuchCode),
            "MAXIMUM_REACHED" => Some(DomainCode::MaximumReached),
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal failures. These abort the call; they are never encoded as domain
/// outcomes.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The method requires an authenticated identity.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// No method registered under this name (hard error, unlike unknown
    /// publications which fail soft).
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Required parameter missing or malformed.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The identity resolver did not answer within its bounded timeout.
    #[error("Identity resolver timed out")]
    ResolverTimeout,

    /// The identity resolver failed outright.
    #[error("Identity resolver failed: {0}")]
    Auth(#[from] AuthError),

    /// The caller disconnected; no further store operations were issued.
    #[error("Request cancelled")]
    Cancelled,

    /// Document store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A compensating write failed; the final state is unknown and must
    /// not be guessed at.
    #[error("Rollback failed for code {code}: {source}")]
    RollbackFailed {
        code: String,
        #[source]
        source: StoreError,
    },
}

impl GatewayError {
    /// Stable wire code for fatal failures, used by the HTTP surface.
    pub fn wire_code(&self) -> &'static str {
        match self {
            GatewayError::NotAuthenticated => "NOT_AUTHENTICATED",
            GatewayError::UnknownMethod(_) => "UNKNOWN_METHOD",
            GatewayError::InvalidParams(_) => "INVALID_PARAMS",
            GatewayError::ResolverTimeout => "RESOLVER_TIMEOUT",
            GatewayError::Auth(_) => "AUTH_FAILED",
            GatewayError::Cancelled => "CANCELLED",
            GatewayError::Store(_) | GatewayError::RollbackFailed { .. } => "INTERNAL_ERROR",
        }
    }
}
