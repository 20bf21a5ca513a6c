//! # HTTP Surface
//!
//! Drives `POST /api/sync` through the router without a socket, covering
//! batched subscriptions and methods, token resolution, and the fatal
//! error mapping onto method result slots.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use sync_gateway::adapters::TokenResolver;
    use sync_gateway::{router, AppState};

    use crate::integration::{gateway, seed_code, seed_user};

    async fn app() -> (axum::Router, Arc<dyn sync_store::DocumentStore>) {
        let (gw, store) = gateway();
        let state = AppState {
            resolver: Arc::new(TokenResolver::new(Arc::clone(&store))),
            gateway: gw,
        };
        (router(state), store)
    }

    async fn post_sync(app: axum::Router, body: Value) -> (StatusCode, Value) {
        let request = Request::post("/api/sync")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_sync_round_trip() {
        let (app, store) = app().await;
        seed_user(&store, "u1", false).await;
        seed_code(&store, "WELCOME10", 10, 100).await;

        let (status, body) = post_sync(
            app,
            json!({
                "auth": { "token": "token-u1" },
                "subscriptions": [{ "name": "user" }],
                "methods": [{ "id": "m1", "name": "redeemCreditCode",
                              "params": { "creditCode": "WELCOME10" } }],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["methods"][0]["id"], json!("m1"));
        assert_eq!(
            body["methods"][0]["result"],
            json!({ "$success": true, "credits": 10 })
        );

        let subs = body["subscriptions"].as_array().unwrap();
        assert_eq!(subs[0]["name"], json!("user"));
        let entries = subs[0]["groups"][0]["entries"].as_array().unwrap();
        assert_eq!(entries[0]["_id"], json!("u1"));
        assert!(entries[0].get("password").is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_degrades_to_anonymous() {
        let (app, store) = app().await;
        seed_user(&store, "u1", false).await;
        seed_code(&store, "WELCOME10", 10, 100).await;

        let (status, body) = post_sync(
            app,
            json!({
                "auth": { "token": "bogus" },
                "subscriptions": [{ "name": "user" }],
                "methods": [{ "id": "m1", "name": "redeemCreditCode",
                              "params": { "creditCode": "WELCOME10" } }],
            }),
        )
        .await;

        // Anonymous callers see empty views; mutation attempts surface the
        // fatal code in the method slot without failing the batch.
        assert_eq!(status, StatusCode::OK);
        assert!(body["subscriptions"][0]["groups"].as_array().unwrap().is_empty());
        assert_eq!(
            body["methods"][0]["result"],
            json!({ "$error": "NOT_AUTHENTICATED" })
        );
    }

    #[tokio::test]
    async fn test_watermarks_thread_through_request() {
        let (app, store) = app().await;
        seed_user(&store, "u1", false).await;

        let (_, first) = post_sync(
            app.clone(),
            json!({
                "auth": { "token": "token-u1" },
                "subscriptions": [{ "name": "user" }],
            }),
        )
        .await;
        let revision = first["subscriptions"][0]["groups"][0]["entries"][0]["__updatedAt"]
            .as_u64()
            .unwrap();

        let (_, second) = post_sync(
            app,
            json!({
                "auth": { "token": "token-u1" },
                "subscriptions": [{ "name": "user",
                                    "watermarks": { "users": revision } }],
            }),
        )
        .await;
        assert!(second["subscriptions"][0]["groups"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let (app, _store) = app().await;
        let methods: Vec<Value> = (0..64)
            .map(|i| json!({ "id": i.to_string(), "name": "redeemCreditCode" }))
            .collect();
        let (status, body) = post_sync(app, json!({ "methods": methods })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "$error": "BATCH_TOO_LARGE" }));
    }
}
