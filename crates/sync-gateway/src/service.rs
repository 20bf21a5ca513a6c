//! HTTP surface: one POST endpoint carrying batched sync operations.
//!
//! Transport framing is deliberately thin — the logical contract lives in
//! `domain::types`. Credentials are resolved once per request; every
//! listed subscription and method then runs under that identity.
//!
//! Error mapping at this boundary:
//! - Resolver failures abort the whole request (nothing below can run
//!   without an identity decision).
//! - Per-method fatal failures surface as `{"$error": "<WIRE_CODE>"}` in
//!   that method's slot; domain outcomes serialize as-is.
//! - Per-subscription store failures degrade to an empty group list on
//!   the wire; the log carries the failure. Authorization never reaches
//!   this layer as an error at all.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::dispatch::resolve_identity;
use crate::domain::error::GatewayError;
use crate::domain::types::{MethodResult, SubscriptionResult, SyncRequest, SyncResponse};
use crate::engine::SyncGateway;
use crate::ports::AuthResolver;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SyncGateway>,
    pub resolver: Arc<dyn AuthResolver>,
}

/// Build the sync router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/sync", post(sync))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Request-level failure: the whole batch was rejected.
#[derive(Debug)]
struct SyncFailure(StatusCode, &'static str);

impl IntoResponse for SyncFailure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "$error": self.1 }))).into_response()
    }
}

impl From<GatewayError> for SyncFailure {
    fn from(e: GatewayError) -> Self {
        let status = match &e {
            GatewayError::NotAuthenticated | GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::ResolverTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        SyncFailure(status, e.wire_code())
    }
}

async fn sync(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, SyncFailure> {
    let limits = &state.gateway.config().limits;
    if request.subscriptions.len() > limits.max_subscriptions_per_request
        || request.methods.len() > limits.max_methods_per_request
    {
        return Err(SyncFailure(StatusCode::BAD_REQUEST, "BATCH_TOO_LARGE"));
    }

    let identity = resolve_identity(
        state.resolver.as_ref(),
        &request.auth,
        state.gateway.config().auth.resolve_timeout,
    )
    .await?;

    info!(
        identity = %identity,
        subscriptions = request.subscriptions.len(),
        methods = request.methods.len(),
        "Sync request"
    );

    let cancel = CancellationToken::new();
    let mut response = SyncResponse::default();

    for sub in request.subscriptions {
        let groups = match state
            .gateway
            .subscribe(&sub.name, &identity, sub.params, &sub.watermarks)
            .await
        {
            Ok(groups) => groups,
            Err(e) => {
                error!(publication = %sub.name, error = %e, "Subscription failed");
                Vec::new()
            }
        };
        response.subscriptions.push(SubscriptionResult {
            name: sub.name,
            groups,
        });
    }

    for call in request.methods {
        let result = match state
            .gateway
            .call(&call.name, &identity, call.params, &cancel)
            .await
        {
            Ok(outcome) => serde_json::to_value(&outcome)
                .unwrap_or_else(|_| json!({ "$error": "INTERNAL_ERROR" })),
            Err(e) => json!({ "$error": e.wire_code() }),
        };
        response.methods.push(MethodResult {
            id: call.id,
            result,
        });
    }

    Ok(Json(response))
}
