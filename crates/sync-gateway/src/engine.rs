//! # Delta Engine
//!
//! Computes, per identity and per client watermark, the minimal set of
//! document changes a client must apply to reach consistency with server
//! state — without leaking unauthorized data.
//!
//! ## Invocation pipeline
//!
//! 1. Look up the publication. Unknown names fail **soft**: the caller
//!    sees an empty result, identical to "no changes". Authorization gaps
//!    inside definitions degrade the same way, so an observer cannot use
//!    the subscription surface as an authorization oracle.
//! 2. Run the definition. Definitions scope their queries to the identity
//!    themselves (`userId == me`); the engine never auto-scopes.
//! 3. Normalize flat output into explicit `{collection, entries}` groups.
//! 4. Drop every entry whose revision marker is not strictly greater than
//!    the caller's watermark for its collection. Bulk definitions also
//!    push this filter into their store query; the engine pass is the
//!    uniform guarantee.
//! 5. Redact every surviving entry, then drop empty groups.
//!
//! No cross-collection snapshot is taken: each group reflects an
//! independent read at call time. Read skew across collections is an
//! accepted tradeoff.

use std::sync::Arc;

use tracing::{debug, warn};

use sync_store::DocumentStore;
use sync_types::{Identity, WatermarkMap};

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::domain::redact::Redactor;
use crate::domain::types::{ChangeGroup, PublicationOutput};
use crate::registry::{Handler, PublicationCx, Registry};

/// The sync core: registry, store handle, redactor and configuration.
/// Holds no per-request state; every request is an independent unit of
/// work and the store is the only shared mutable resource.
pub struct SyncGateway {
    pub(crate) registry: Registry,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) redactor: Redactor,
    pub(crate) config: GatewayConfig,
}

impl SyncGateway {
    pub fn new(store: Arc<dyn DocumentStore>, registry: Registry, config: GatewayConfig) -> Self {
        let redactor = Redactor::from_config(&config.redact);
        Self {
            registry,
            store,
            redactor,
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Invoke a publication and compute its change-set.
    ///
    /// An empty vec is a normal, successful outcome meaning "no changes" —
    /// and also the fail-soft result for unknown or unauthorized
    /// subscriptions. Store failures are real errors and do propagate.
    pub async fn subscribe(
        &self,
        name: &str,
        identity: &Identity,
        params: serde_json::Value,
        watermarks: &WatermarkMap,
    ) -> Result<Vec<ChangeGroup>, GatewayError> {
        let Some(Handler::Publication {
            default_collection,
            f,
        }) = self.registry.get(name)
        else {
            // Fail soft: indistinguishable from an empty result on the
            // wire. The log is the only place this is visible.
            warn!(publication = %name, "Unknown publication");
            return Ok(Vec::new());
        };

        let output = f(PublicationCx {
            store: Arc::clone(&self.store),
            identity: identity.clone(),
            params,
            watermarks: watermarks.clone(),
        })
        .await?;

        let default_collection = default_collection.as_deref().unwrap_or(name);
        let groups = normalize(output, default_collection);
        let groups = self.apply_deltas(groups, watermarks);

        debug!(
            publication = %name,
            identity = %identity,
            groups = groups.len(),
            "Subscription computed"
        );
        Ok(groups)
    }

    /// Watermark filtering and mandatory redaction.
    fn apply_deltas(
        &self,
        groups: Vec<ChangeGroup>,
        watermarks: &WatermarkMap,
    ) -> Vec<ChangeGroup> {
        groups
            .into_iter()
            .filter_map(|group| {
                let watermark = watermarks.for_collection(&group.collection);
                let entries: Vec<_> = group
                    .entries
                    .into_iter()
                    .filter(|doc| doc.revision() > watermark)
                    .map(|doc| self.redactor.redact(doc))
                    .collect();
                if entries.is_empty() {
                    None
                } else {
                    Some(ChangeGroup::new(group.collection, entries))
                }
            })
            .collect()
    }
}

/// Normalize publication output into the explicit grouped form, so the
/// rest of the pipeline handles exactly one shape.
fn normalize(output: PublicationOutput, default_collection: &str) -> Vec<ChangeGroup> {
    match output {
        PublicationOutput::Groups(groups) => groups,
        PublicationOutput::Docs(docs) => {
            if docs.is_empty() {
                Vec::new()
            } else {
                vec![ChangeGroup::new(default_collection, docs)]
            }
        }
    }
}
