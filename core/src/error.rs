//! Error types for the todo API client.
//!
//! # Design
//! The server answers 400 and 404 with a structured `{"error": {...}}`
//! envelope. Those are decoded back into `Validation` and `NotFound` so
//! callers can match on the failing fields or the missing resource. Any other
//! non-2xx response lands in `HttpError` with the raw status and body.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 ValidationError: field name → violation.
    #[error("validation failed: {invalid_fields:?}")]
    Validation {
        invalid_fields: BTreeMap<String, String>,
    },

    /// 404 ResourceNotFoundError.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(tag = "name")]
enum ErrorBody {
    #[serde(rename_all = "camelCase")]
    ValidationError {
        invalid_fields: BTreeMap<String, String>,
    },
    ResourceNotFoundError {
        resource: String,
    },
}

impl ApiError {
    /// Decode a server error envelope, falling back to `HttpError` when the
    /// body is not one of the known shapes.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope {
                error: ErrorBody::ValidationError { invalid_fields },
            }) if status == 400 => ApiError::Validation { invalid_fields },
            Ok(ErrorEnvelope {
                error: ErrorBody::ResourceNotFoundError { resource },
            }) if status == 404 => ApiError::NotFound { resource },
            _ => ApiError::HttpError {
                status,
                body: body.to_string(),
            },
        }
    }
}
