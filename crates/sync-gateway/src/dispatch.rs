//! # Method Dispatcher
//!
//! Looks up and invokes named mutations. Unlike publications, an unknown
//! method name is a hard error: method callers made a well-formed request
//! for something that does not exist, and hiding that would only mask
//! deployment bugs. Domain errors come back as data inside
//! `MethodOutcome`; fatal failures abort the call.

use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use sync_types::Identity;

use crate::domain::error::GatewayError;
use crate::domain::types::MethodOutcome;
use crate::engine::SyncGateway;
use crate::ports::{AuthResolver, RequestCredentials};
use crate::registry::{Handler, MethodCx};

impl SyncGateway {
    /// Invoke a method under the given identity.
    ///
    /// `cancel` is consulted by methods before issuing writes for a caller
    /// that has already disconnected; store operations already in flight
    /// are always allowed to complete.
    pub async fn call(
        &self,
        name: &str,
        identity: &Identity,
        params: Value,
        cancel: &CancellationToken,
    ) -> Result<MethodOutcome, GatewayError> {
        let Some(Handler::Method(f)) = self.registry.get(name) else {
            // A publication name used as a method is just as unknown.
            return Err(GatewayError::UnknownMethod(name.to_string()));
        };

        let outcome = f(MethodCx {
            store: std::sync::Arc::clone(&self.store),
            identity: identity.clone(),
            params,
            cancel: cancel.clone(),
        })
        .await;

        match &outcome {
            Ok(result) => debug!(
                method = %name,
                identity = %identity,
                success = result.is_success(),
                "Method dispatched"
            ),
            Err(e) => error!(method = %name, identity = %identity, error = %e, "Method failed"),
        }
        outcome
    }
}

/// Resolve an identity with the configured hard bound. Expiry is a fatal
/// failure — never a silent downgrade to anonymous, which would turn a
/// slow resolver into an authorization change.
pub async fn resolve_identity(
    resolver: &dyn AuthResolver,
    credentials: &RequestCredentials,
    timeout: Duration,
) -> Result<Identity, GatewayError> {
    match tokio::time::timeout(timeout, resolver.resolve(credentials)).await {
        Ok(Ok(identity)) => Ok(identity),
        Ok(Err(e)) => Err(GatewayError::Auth(e)),
        Err(_) => Err(GatewayError::ResolverTimeout),
    }
}
