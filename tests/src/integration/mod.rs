//! Cross-crate integration tests with shared fixtures.

pub mod http;
pub mod redemption;
pub mod subscriptions;

use std::sync::Arc;

use serde_json::{json, Value};

use sync_gateway::publications::register_builtins;
use sync_gateway::{GatewayConfig, Registry, SyncGateway};
use sync_store::{DocumentStore, MemoryStore};
use sync_types::{collections, CreditCode, Document};

/// Build a gateway over a fresh in-memory store with the built-in
/// publications and methods registered.
pub fn gateway() -> (Arc<SyncGateway>, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let mut registry = Registry::new();
    register_builtins(&mut registry);
    let gateway = Arc::new(SyncGateway::new(
        Arc::clone(&store),
        registry,
        GatewayConfig::default(),
    ));
    (gateway, store)
}

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => Document::from_map(map),
        _ => panic!("test documents must be objects"),
    }
}

/// Insert a user with an auth token; `admin` users get the flag set.
pub async fn seed_user(store: &Arc<dyn DocumentStore>, id: &str, admin: bool) {
    let mut user = json!({
        "_id": id,
        "displayName": format!("User {id}"),
        "emails": [{ "address": format!("{id}@example.com") }],
        "authToken": format!("token-{id}"),
        "password": "hunter2",
        "services": { "resume": {} },
        "credits": { "free": 0 },
    });
    if admin {
        user["admin"] = json!(true);
    }
    store
        .insert_one(collections::USERS, doc(user))
        .await
        .unwrap();
}

pub async fn seed_code(store: &Arc<dyn DocumentStore>, name: &str, credits: i64, total: i64) {
    let code = CreditCode {
        name: name.to_string(),
        credits,
        used: 0,
        total,
    };
    store
        .insert_one(collections::CREDIT_CODES, code.to_document())
        .await
        .unwrap();
}
