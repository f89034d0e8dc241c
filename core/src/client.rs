//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Successful bodies are unwrapped from their `todo` / `todos` envelope.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, TodoEnvelope, TodosEnvelope, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn todo_path(&self, id: &str) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_patch_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: self.todo_path(id),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.todo_path(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        from_json::<TodosEnvelope>(&response.body).map(|e| e.todos)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        from_json::<TodoEnvelope>(&response.body).map(|e| e.todo)
    }

    pub fn parse_patch_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        from_json::<TodoEnvelope>(&response.body).map(|e| e.todo)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::from_response(response.status, &response.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "5b72ecfdbf16f1384b053639";

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn todo_json(title: &str, completed: bool) -> String {
        format!(
            r#"{{"_id":"{ID}","title":"{title}","completed":{completed},"createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z"}}"#
        )
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            title: "Buy milk".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        assert_eq!(req.headers, json_headers());
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "Buy milk" }));
    }

    #[test]
    fn build_patch_todo_omits_unset_fields() {
        let input = UpdateTodo {
            title: Some("Updated".to_string()),
            completed: None,
        };
        let req = client().build_patch_todo(ID, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, format!("http://localhost:3000/todos/{ID}"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Updated");
        assert!(body.get("completed").is_none());
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(ID);
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_unwraps_envelope() {
        let body = format!(r#"{{"todos":[{}]}}"#, todo_json("Test", false));
        let todos = client().parse_list_todos(response(200, &body)).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, ID);
        assert_eq!(todos[0].title, "Test");
    }

    #[test]
    fn parse_create_todo_unwraps_envelope() {
        let body = format!(r#"{{"todo":{}}}"#, todo_json("New", false));
        let todo = client().parse_create_todo(response(201, &body)).unwrap();
        assert_eq!(todo.title, "New");
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[test]
    fn parse_create_todo_validation_error() {
        let body = r#"{"error":{"name":"ValidationError","invalidFields":{"title":"required"}}}"#;
        let err = client().parse_create_todo(response(400, body)).unwrap_err();
        match err {
            ApiError::Validation { invalid_fields } => {
                assert_eq!(invalid_fields["title"], "required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_patch_todo_not_found() {
        let body = r#"{"error":{"name":"ResourceNotFoundError","resource":"Todo"}}"#;
        let err = client().parse_patch_todo(response(404, body)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref resource } if resource == "Todo"));
    }

    #[test]
    fn parse_patch_todo_success() {
        let body = format!(r#"{{"todo":{}}}"#, todo_json("Updated", true));
        let todo = client().parse_patch_todo(response(200, &body)).unwrap();
        assert_eq!(todo.title, "Updated");
        assert!(todo.completed);
    }

    #[test]
    fn unexpected_status_is_http_error() {
        let err = client()
            .parse_create_todo(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn bare_404_without_envelope_is_http_error() {
        let err = client().parse_delete_todo(response(404, "{}")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 404, .. }));
    }

    #[test]
    fn parse_delete_todo_success() {
        assert!(client().parse_delete_todo(response(204, "")).is_ok());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        assert_eq!(client.build_list_todos().path, "http://localhost:3000/todos");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
