//! Errors for converting raw documents into typed domain views.

use thiserror::Error;

/// A document did not have the shape a typed view requires.
#[derive(Debug, Clone, Error)]
pub enum EntityError {
    /// Required field missing from the document.
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    /// Field present but of the wrong JSON type.
    #[error("Wrong type for field {field}: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}
