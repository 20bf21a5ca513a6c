//! Publication and method registry.
//!
//! Handlers are looked up by name at call time from a single map built
//! during startup — a sum type over the two handler kinds, no reflection.
//! Registration is a static setup phase: re-registering a name replaces
//! the previous definition (last writer wins) rather than erroring.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use sync_store::{DocumentStore, StoreError};
use sync_types::{Identity, WatermarkMap};

use crate::domain::error::GatewayError;
use crate::domain::types::{MethodOutcome, PublicationOutput};

/// Everything a publication definition can see. Definitions must be pure
/// reads: they query the store scoped to `identity` and return documents,
/// nothing else.
#[derive(Clone)]
pub struct PublicationCx {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Identity,
    pub params: Value,
    pub watermarks: WatermarkMap,
}

/// Everything a method definition can see. Methods may mutate through the
/// store; `cancel` is checked before issuing writes on behalf of a caller
/// that has already disconnected.
#[derive(Clone)]
pub struct MethodCx {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Identity,
    pub params: Value,
    pub cancel: CancellationToken,
}

impl MethodCx {
    /// Required string parameter, by field name.
    pub fn str_param(&self, name: &'static str) -> Result<&str, GatewayError> {
        self.params
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::InvalidParams(format!("missing string param {name}")))
    }
}

pub type PublicationFn =
    dyn Fn(PublicationCx) -> BoxFuture<'static, Result<PublicationOutput, StoreError>>
        + Send
        + Sync;

pub type MethodFn =
    dyn Fn(MethodCx) -> BoxFuture<'static, Result<MethodOutcome, GatewayError>> + Send + Sync;

/// A named handler: read view or mutation.
#[derive(Clone)]
pub enum Handler {
    Publication {
        /// Collection that flat (legacy) output maps to; defaults to the
        /// publication name when not set explicitly.
        default_collection: Option<String>,
        f: Arc<PublicationFn>,
    },
    Method(Arc<MethodFn>),
}

/// Name → handler map, resolved once at startup.
#[derive(Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publication. Flat output maps to the collection named
    /// like the publication.
    pub fn publish<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(PublicationCx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PublicationOutput, StoreError>> + Send + 'static,
    {
        self.insert_publication(name.into(), None, f);
    }

    /// Register a publication whose flat output maps to an explicit
    /// collection.
    pub fn publish_collection<F, Fut>(
        &mut self,
        name: impl Into<String>,
        collection: impl Into<String>,
        f: F,
    ) where
        F: Fn(PublicationCx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PublicationOutput, StoreError>> + Send + 'static,
    {
        self.insert_publication(name.into(), Some(collection.into()), f);
    }

    fn insert_publication<F, Fut>(&mut self, name: String, default_collection: Option<String>, f: F)
    where
        F: Fn(PublicationCx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PublicationOutput, StoreError>> + Send + 'static,
    {
        let f: Arc<PublicationFn> = Arc::new(
            move |cx: PublicationCx| -> BoxFuture<'static, Result<PublicationOutput, StoreError>> {
                Box::pin(f(cx))
            },
        );
        if self
            .handlers
            .insert(name.clone(), Handler::Publication {
                default_collection,
                f,
            })
            .is_some()
        {
            debug!(publication = %name, "Replaced publication definition");
        }
    }

    /// Register a method.
    pub fn method<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(MethodCx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<MethodOutcome, GatewayError>> + Send + 'static,
    {
        let name = name.into();
        let f: Arc<MethodFn> = Arc::new(
            move |cx: MethodCx| -> BoxFuture<'static, Result<MethodOutcome, GatewayError>> {
                Box::pin(f(cx))
            },
        );
        if self.handlers.insert(name.clone(), Handler::Method(f)).is_some() {
            debug!(method = %name, "Replaced method definition");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
