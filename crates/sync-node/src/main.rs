//! # MirrorSync Node
//!
//! The main entry point for the MirrorSync gateway server.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`MIRRORSYNC_LOG` filter, defaults to `info`)
//! 2. Load configuration from environment
//! 3. Create the document store and seed demo data (if enabled)
//! 4. Register built-in publications and methods
//! 5. Serve `POST /api/sync` until Ctrl+C

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sync_gateway::adapters::TokenResolver;
use sync_gateway::domain::config::GatewayConfig;
use sync_gateway::publications::register_builtins;
use sync_gateway::registry::Registry;
use sync_gateway::{router, AppState, SyncGateway};
use sync_store::{DocumentStore, MemoryStore};
use sync_types::{collections, CreditCode, Document};

/// Node-level configuration, separate from the gateway's own config.
struct NodeConfig {
    listen_addr: String,
    seed_demo_data: bool,
    gateway: GatewayConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            seed_demo_data: false,
            gateway: GatewayConfig::default(),
        }
    }
}

/// Load configuration from environment.
fn load_config() -> Result<NodeConfig> {
    let mut config = NodeConfig::default();

    if let Ok(addr) = std::env::var("MIRRORSYNC_ADDR") {
        config.listen_addr = addr;
    }
    if let Ok(seed) = std::env::var("MIRRORSYNC_SEED") {
        config.seed_demo_data = seed == "1" || seed.eq_ignore_ascii_case("true");
    }

    config
        .gateway
        .validate()
        .context("Invalid gateway configuration")?;
    Ok(config)
}

fn object(value: serde_json::Value) -> Result<Document> {
    match value {
        serde_json::Value::Object(map) => Ok(Document::from_map(map)),
        other => anyhow::bail!("seed document is not an object: {other}"),
    }
}

/// Insert a small fixture set for local development: one admin, one regular
/// user, and a redeemable credit code. Tokens are printed so a client can
/// authenticate immediately.
async fn seed_demo_data(store: &Arc<dyn DocumentStore>) -> Result<()> {
    let created_at = chrono::Utc::now().to_rfc3339();

    let admin = object(json!({
        "_id": "demo-admin",
        "displayName": "Demo Admin",
        "emails": [{ "address": "admin@example.com" }],
        "admin": true,
        "authToken": "demo-admin-token",
        "credits": { "free": 0 },
        "createdAt": created_at,
    }))?;
    store
        .insert_one(collections::USERS, admin)
        .await
        .context("Failed to seed admin user")?;

    let user = object(json!({
        "_id": "demo-user",
        "displayName": "Demo User",
        "emails": [{ "address": "user@example.com" }],
        "authToken": "demo-user-token",
        "credits": { "free": 0 },
        "createdAt": created_at,
    }))?;
    store
        .insert_one(collections::USERS, user)
        .await
        .context("Failed to seed user")?;

    let code = CreditCode {
        name: "WELCOME10".to_string(),
        credits: 10,
        used: 0,
        total: 100,
    };
    store
        .insert_one(collections::CREDIT_CODES, code.to_document())
        .await
        .context("Failed to seed credit code")?;

    info!("Seeded demo data: tokens demo-admin-token / demo-user-token, code WELCOME10");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MIRRORSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = load_config()?;

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    if config.seed_demo_data {
        seed_demo_data(&store).await?;
    }

    let mut registry = Registry::new();
    register_builtins(&mut registry);

    let state = AppState {
        resolver: Arc::new(TokenResolver::new(Arc::clone(&store))),
        gateway: Arc::new(SyncGateway::new(store, registry, config.gateway)),
    };

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "MirrorSync node listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}
