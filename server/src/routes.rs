//! HTTP dispatch: one route per service operation.
//!
//! Handlers stay thin. They decode the body, call `TodoService`, and wrap the
//! result in its envelope key; error-to-status mapping lives on `ApiError`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::model::{CreateTodo, UpdateTodo};
use crate::service::TodoService;

pub const SERVICE_NAME: &str = "todo-demo";

pub fn router(service: TodoService) -> Router {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/todos", get(list_todos).post(create_todo).fallback(not_found))
        .route(
            "/todos/{id}",
            patch(patch_todo).delete(delete_todo).fallback(not_found),
        )
        .fallback(not_found)
        .with_state(service)
}

/// Decode a JSON request body. An empty body, or JSON that is not an object,
/// carries no fields.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    match serde_json::from_slice::<Value>(body)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(T::default()),
    }
}

async fn index() -> Json<Value> {
    Json(json!({ "name": SERVICE_NAME }))
}

async fn list_todos(State(service): State<TodoService>) -> Result<Json<Value>, ApiError> {
    let todos = service.list().await?;
    Ok(Json(json!({ "todos": todos })))
}

async fn create_todo(
    State(service): State<TodoService>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input: CreateTodo = parse_body(&body)?;
    let todo = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "todo": todo }))))
}

async fn patch_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let input: UpdateTodo = parse_body(&body)?;
    let todo = service.patch(&id, input).await?;
    Ok(Json(json!({ "todo": todo })))
}

async fn delete_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_empty_input() {
        let input: UpdateTodo = parse_body(b"").unwrap();
        assert!(input.title.is_none());
        assert!(input.completed.is_none());
    }

    #[test]
    fn non_object_body_has_no_fields() {
        let input: CreateTodo = parse_body(br#"["title"]"#).unwrap();
        assert!(input.title.is_none());
    }

    #[test]
    fn object_body_is_decoded() {
        let input: UpdateTodo = parse_body(br#"{"completed":false}"#).unwrap();
        assert_eq!(input.completed, Some(json!(false)));
    }

    #[test]
    fn malformed_body_is_rejected() {
        let err = parse_body::<CreateTodo>(b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
    }
}
