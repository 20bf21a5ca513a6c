//! Field redactor.
//!
//! Strips fields that must never cross the trust boundary (credentials,
//! internal auth artifacts) from any document before transmission. Applied
//! as a mandatory pass inside the delta engine, not opt-in per
//! publication, so a newly sensitive field needs exactly one denylist
//! entry. Pure, total (unknown documents pass through unchanged aside from
//! field removal) and idempotent.

use sync_types::Document;

use super::config::RedactConfig;

#[derive(Debug, Clone)]
pub struct Redactor {
    fields: Vec<String>,
}

impl Redactor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &RedactConfig) -> Self {
        Self {
            fields: config.fields.clone(),
        }
    }

    pub fn redact(&self, mut doc: Document) -> Document {
        for field in &self.fields {
            doc.remove(field);
        }
        doc
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::from_config(&RedactConfig::default())
    }
}
