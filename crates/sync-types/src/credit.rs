//! # Credit Codes
//!
//! Typed view over `creditCodes` documents.
//!
//! A credit code is a shared, capped resource: `{name, credits, used,
//! total}` where `name` is unique per collection and the store must uphold
//! `used <= total` at all times, even under concurrent redemption. The
//! redemption transaction lives in the gateway; this module only gives the
//! raw document a shape.

use serde_json::json;

use crate::entities::Document;
use crate::errors::EntityError;
use crate::fields;

/// A capped credit grant, redeemable at most once per user and at most
/// `total` times globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditCode {
    /// Unique code name (`WELCOME10`).
    pub name: String,
    /// Credits granted per successful redemption.
    pub credits: i64,
    /// Redemptions performed so far.
    pub used: i64,
    /// Global redemption quota.
    pub total: i64,
}

impl CreditCode {
    /// Remaining redemptions before the cap is reached.
    pub fn remaining(&self) -> i64 {
        (self.total - self.used).max(0)
    }

    /// Document shape as stored in the `creditCodes` collection. The `_id`
    /// is left to the store.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.set(fields::CODE_NAME, json!(self.name));
        doc.set(fields::CODE_CREDITS, json!(self.credits));
        doc.set(fields::CODE_USED, json!(self.used));
        doc.set(fields::CODE_TOTAL, json!(self.total));
        doc
    }
}

impl TryFrom<&Document> for CreditCode {
    type Error = EntityError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        fn required_i64(doc: &Document, field: &'static str) -> Result<i64, EntityError> {
            match doc.get(field) {
                None => Err(EntityError::MissingField { field }),
                Some(v) => v.as_i64().ok_or(EntityError::WrongType {
                    field,
                    expected: "integer",
                }),
            }
        }

        let name = doc
            .str_field(fields::CODE_NAME)
            .ok_or(EntityError::MissingField {
                field: fields::CODE_NAME,
            })?
            .to_string();

        Ok(CreditCode {
            name,
            credits: required_i64(doc, fields::CODE_CREDITS)?,
            used: required_i64(doc, fields::CODE_USED)?,
            total: required_i64(doc, fields::CODE_TOTAL)?,
        })
    }
}
