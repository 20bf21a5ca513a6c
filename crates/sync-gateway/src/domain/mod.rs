//! Gateway domain: configuration, errors, wire types, redaction.

pub mod config;
pub mod error;
pub mod redact;
pub mod types;
