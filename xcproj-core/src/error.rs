//! Codec errors
//!
//! Every variant carries enough context (object identifier, field name) to
//! locate the offending record in the project file.

/// Errors raised while decoding, resolving or encoding project objects
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Object {object} is missing required field `{field}`")]
    MissingRequiredField { object: String, field: String },

    #[error("Object {object} has invalid value {value:?} for `{field}`")]
    InvalidEnumValue {
        object: String,
        field: String,
        value: String,
    },

    #[error("Object {object} field `{field}` should be {expected}")]
    TypeMismatch {
        object: String,
        field: String,
        expected: &'static str,
    },

    #[error("Reference {reference} does not resolve to any object")]
    DanglingReference { reference: String },

    #[error("Reference {reference} resolves to {found}, expected {expected}")]
    UnexpectedObjectKind {
        reference: String,
        expected: &'static str,
        found: String,
    },

    #[error("Failed to parse project JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub(crate) fn missing(object: &str, field: &str) -> Self {
        CodecError::MissingRequiredField {
            object: object.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn mismatch(object: &str, field: &str, expected: &'static str) -> Self {
        CodecError::TypeMismatch {
            object: object.to_string(),
            field: field.to_string(),
            expected,
        }
    }

    pub(crate) fn dangling(reference: &str) -> Self {
        CodecError::DanglingReference {
            reference: reference.to_string(),
        }
    }
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
