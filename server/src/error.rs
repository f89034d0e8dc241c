//! Error taxonomy for the todo service.
//!
//! # Design
//! `ValidationError` and `ResourceNotFoundError` are ordinary outcomes of a
//! request, not faults: the router turns them into 400 and 404 responses on
//! every route. Anything else (a failing store, a poisoned lock) is wrapped in
//! `TodoError::Store` and answered with a bare 500 after being logged.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Resource name reported when a todo cannot be located.
pub const TODO_RESOURCE: &str = "Todo";

/// One or more submitted fields failed validation.
///
/// Every failing field is reported at once; the map goes from field name to a
/// short human-readable violation such as `"required"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("validation failed for {}", .invalid_fields.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    pub invalid_fields: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn field(name: &str, message: &str) -> Self {
        let mut invalid_fields = BTreeMap::new();
        invalid_fields.insert(name.to_string(), message.to_string());
        Self { invalid_fields }
    }

    pub const NAME: &'static str = "ValidationError";
}

/// The target of a request does not exist (or its id is not even well-formed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{resource} not found")]
pub struct ResourceNotFoundError {
    pub resource: String,
}

impl ResourceNotFoundError {
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
        }
    }

    pub fn todo() -> Self {
        Self::new(TODO_RESOURCE)
    }

    pub const NAME: &'static str = "ResourceNotFoundError";
}

/// Failures raised by a `TodoStore` backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Everything a `TodoService` operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] ResourceNotFoundError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors produced by the HTTP layer itself, before the service is reached.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        match self {
            TodoError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": {
                        "name": ValidationError::NAME,
                        "invalidFields": err.invalid_fields,
                    }
                })),
            )
                .into_response(),
            TodoError::NotFound(err) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": {
                        "name": ResourceNotFoundError::NAME,
                        "resource": err.resource,
                    }
                })),
            )
                .into_response(),
            TodoError::Store(err) => {
                tracing::error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": { "name": "InternalServerError" } })),
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Todo(err) => err.into_response(),
            ApiError::MalformedBody(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": {
                        "name": "MalformedBodyError",
                        "message": err.to_string(),
                    }
                })),
            )
                .into_response(),
        }
    }
}
