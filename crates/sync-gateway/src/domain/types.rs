//! Wire types for the sync protocol.
//!
//! Method results follow the tagged shape of the protocol: successes
//! serialize as `{"$success": true, ...fields}` and domain errors as
//! `{"$error": "<CODE>"}`. Fatal failures never pass through these types;
//! the service layer maps them separately.

use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use sync_types::{Document, WatermarkMap};

use super::error::DomainCode;

// =============================================================================
// SUBSCRIPTION SIDE
// =============================================================================

/// One collection's entries within a subscription response. The client
/// applies each group directly to its local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeGroup {
    pub collection: String,
    pub entries: Vec<Document>,
}

impl ChangeGroup {
    pub fn new(collection: impl Into<String>, entries: Vec<Document>) -> Self {
        Self {
            collection: collection.into(),
            entries,
        }
    }
}

/// What a publication definition returns. The legacy flat form targets the
/// publication's default collection; the registry normalizes both shapes
/// into explicit groups before the delta engine sees them.
#[derive(Debug, Clone, PartialEq)]
pub enum PublicationOutput {
    /// Flat document sequence for the default collection.
    Docs(Vec<Document>),
    /// Explicit per-collection groups.
    Groups(Vec<ChangeGroup>),
}

impl PublicationOutput {
    /// Empty output — the normal "nothing to send" (and fail-soft) result.
    pub fn empty() -> Self {
        PublicationOutput::Groups(Vec::new())
    }
}

// =============================================================================
// METHOD SIDE
// =============================================================================

/// Tagged result of a method call. Domain errors are data, not failures:
/// callers branch on them.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOutcome {
    /// `{"$success": true, ...fields}`
    Success(Map<String, Value>),
    /// `{"$error": "<CODE>"}`
    Error(DomainCode),
}

impl MethodOutcome {
    pub fn success() -> Self {
        MethodOutcome::Success(Map::new())
    }

    pub fn success_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = Map::new();
        fields.insert(field.into(), value.into());
        MethodOutcome::Success(fields)
    }

    pub fn domain(code: DomainCode) -> Self {
        MethodOutcome::Error(code)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodOutcome::Success(_))
    }
}

impl Serialize for MethodOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MethodOutcome::Success(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("$success", &true)?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            MethodOutcome::Error(code) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$error", code.as_str())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for MethodOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        if let Some(code) = fields.get("$error").and_then(Value::as_str) {
            return DomainCode::from_wire(code)
                .map(MethodOutcome::Error)
                .ok_or_else(|| D::Error::custom(format!("unknown domain code: {code}")));
        }
        if fields.remove("$success").is_some() {
            return Ok(MethodOutcome::Success(fields));
        }
        Err(D::Error::custom("missing $success or $error tag"))
    }
}

// =============================================================================
// SYNC REQUEST/RESPONSE ENVELOPE
// =============================================================================

/// One subscription call inside a sync request.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCall {
    pub name: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub watermarks: WatermarkMap,
}

/// One method call inside a sync request. `id` correlates the result.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

/// Batched sync request: credentials resolved once, then every listed
/// subscription and method executed under that identity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncRequest {
    pub auth: crate::ports::RequestCredentials,
    pub subscriptions: Vec<SubscriptionCall>,
    pub methods: Vec<MethodCall>,
}

/// Result of one subscription call.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResult {
    pub name: String,
    pub groups: Vec<ChangeGroup>,
}

/// Result of one method call; `result` is the tagged method shape (domain
/// outcomes and fatal failures both surface under `$success`/`$error`).
#[derive(Debug, Clone, Serialize)]
pub struct MethodResult {
    pub id: String,
    pub result: Value,
}

/// Batched sync response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResponse {
    pub subscriptions: Vec<SubscriptionResult>,
    pub methods: Vec<MethodResult>,
}
