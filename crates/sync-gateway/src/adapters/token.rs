//! Token-based identity resolver backed by the `users` collection.
//!
//! Looks the bearer token up on the user document. An unknown token
//! resolves to `Anonymous` (logged at debug), matching the contract that
//! "not logged in" is a low-privilege identity rather than an error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sync_store::{DocumentStore, Filter};
use sync_types::{collections, Identity};

use crate::ports::{AuthError, AuthResolver, RequestCredentials};

/// Field on user documents holding the session token.
const AUTH_TOKEN_FIELD: &str = "authToken";

pub struct TokenResolver {
    store: Arc<dyn DocumentStore>,
}

impl TokenResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthResolver for TokenResolver {
    async fn resolve(&self, credentials: &RequestCredentials) -> Result<Identity, AuthError> {
        let Some(token) = credentials.token.as_deref() else {
            return Ok(Identity::Anonymous);
        };
        if token.is_empty() {
            return Ok(Identity::Anonymous);
        }

        let user = self
            .store
            .find_one(
                collections::USERS,
                &Filter::new().eq(AUTH_TOKEN_FIELD, token),
            )
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        match user.as_ref().and_then(|u| u.id()) {
            Some(id) => Ok(Identity::user(id)),
            None => {
                debug!("Unknown auth token, resolving as anonymous");
                Ok(Identity::Anonymous)
            }
        }
    }
}
