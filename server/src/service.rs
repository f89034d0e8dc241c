//! Todo business rules: validation, sanitization, timestamps.
//!
//! # Design
//! `TodoService` holds nothing but a shared store handle, so one instance is
//! cloned into every request. Each operation is a straight
//! validate → sanitize → store call pipeline with a single await point.
//!
//! Patch input is checked field by field and every violation is collected
//! before failing, so a client sending two bad fields hears about both.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::{ResourceNotFoundError, TodoError, ValidationError};
use crate::model::{CreateTodo, Todo, TodoChanges, TodoDraft, UpdateTodo};
use crate::object_id::ObjectId;
use crate::store::TodoStore;

const REQUIRED: &str = "required";
const MUST_BE_STRING: &str = "must be a string";
const MUST_BE_BOOLEAN: &str = "must be a boolean";
const CANNOT_BE_EMPTY: &str = "cannot be an empty string";

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TodoStore> {
        &self.store
    }

    /// Every todo, oldest first.
    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        Ok(self.store.list().await?)
    }

    pub async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        let title = match input.title {
            Some(value) if is_truthy(&value) => value,
            _ => return Err(ValidationError::field("title", REQUIRED).into()),
        };
        let title = match title {
            Value::String(s) => s.trim().to_string(),
            _ => return Err(ValidationError::field("title", MUST_BE_STRING).into()),
        };
        if title.is_empty() {
            return Err(ValidationError::field("title", CANNOT_BE_EMPTY).into());
        }

        let now = Utc::now();
        let todo = self
            .store
            .insert(TodoDraft {
                title,
                completed: false,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    pub async fn patch(&self, id: &str, input: UpdateTodo) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        let changes = validate(sanitize(input))?;

        let todo = self
            .store
            .update(&id, changes)
            .await?
            .ok_or_else(ResourceNotFoundError::todo)?;

        tracing::debug!(%id, "todo patched");
        Ok(todo)
    }

    pub async fn delete(&self, id: &str) -> Result<(), TodoError> {
        let id = parse_id(id)?;

        if self.store.delete(&id).await? != 1 {
            return Err(ResourceNotFoundError::todo().into());
        }

        tracing::debug!(%id, "todo deleted");
        Ok(())
    }
}

/// A malformed id is reported exactly like a missing one.
fn parse_id(id: &str) -> Result<ObjectId, ResourceNotFoundError> {
    ObjectId::parse_str(id).map_err(|_| ResourceNotFoundError::todo())
}

/// Loose truthiness: `false`, `0`, and `""` count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The supplied patch fields, with string titles trimmed.
#[derive(Debug, Default)]
struct Sanitized {
    title: Option<Value>,
    completed: Option<Value>,
}

fn sanitize(input: UpdateTodo) -> Sanitized {
    let title = input.title.map(|value| match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    });
    Sanitized {
        title,
        completed: input.completed,
    }
}

fn validate(fields: Sanitized) -> Result<TodoChanges, ValidationError> {
    let mut invalid_fields = BTreeMap::new();

    let title = match fields.title {
        None => None,
        Some(Value::String(s)) if s.is_empty() => {
            invalid_fields.insert("title".to_string(), CANNOT_BE_EMPTY.to_string());
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            invalid_fields.insert("title".to_string(), MUST_BE_STRING.to_string());
            None
        }
    };

    let completed = match fields.completed {
        None => None,
        Some(Value::Bool(b)) => Some(b),
        Some(_) => {
            invalid_fields.insert("completed".to_string(), MUST_BE_BOOLEAN.to_string());
            None
        }
    };

    if !invalid_fields.is_empty() {
        return Err(ValidationError { invalid_fields });
    }

    Ok(TodoChanges {
        title,
        completed,
        updated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryStore::new()))
    }

    fn create_input(title: Value) -> CreateTodo {
        CreateTodo { title: Some(title) }
    }

    fn patch_input(value: Value) -> UpdateTodo {
        serde_json::from_value(value).unwrap()
    }

    fn invalid_fields(err: TodoError) -> BTreeMap<String, String> {
        match err {
            TodoError::Validation(e) => e.invalid_fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn assert_not_found(err: TodoError) {
        match err {
            TodoError::NotFound(e) => assert_eq!(e.resource, "Todo"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_requires_title() {
        let svc = service();
        for input in [CreateTodo::default(), create_input(json!("")), create_input(json!(0))] {
            let fields = invalid_fields(svc.create(input).await.unwrap_err());
            assert_eq!(fields["title"], "required");
        }
    }

    #[tokio::test]
    async fn create_rejects_non_string_title() {
        let fields = invalid_fields(service().create(create_input(json!(123))).await.unwrap_err());
        assert_eq!(fields["title"], "must be a string");
    }

    #[tokio::test]
    async fn create_rejects_whitespace_only_title() {
        let fields = invalid_fields(service().create(create_input(json!("   "))).await.unwrap_err());
        assert_eq!(fields["title"], "cannot be an empty string");
    }

    #[tokio::test]
    async fn create_trims_and_stamps() {
        let before = Utc::now();
        let todo = service().create(create_input(json!(" My Todo "))).await.unwrap();
        assert_eq!(todo.title, "My Todo");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(todo.created_at >= before);
    }

    #[tokio::test]
    async fn create_allows_duplicate_titles() {
        let svc = service();
        let a = svc.create(create_input(json!("Same"))).await.unwrap();
        let b = svc.create(create_input(json!("Same"))).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(svc.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_returns_creation_order() {
        let svc = service();
        for title in ["one", "two", "three"] {
            svc.create(create_input(json!(title))).await.unwrap();
        }
        let titles: Vec<String> = svc.list().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn patch_malformed_or_missing_id_is_not_found() {
        let svc = service();
        let input = || patch_input(json!({ "completed": true }));
        assert_not_found(svc.patch("1", input()).await.unwrap_err());
        assert_not_found(svc.patch("5b72ecfdbf16f1384b053639", input()).await.unwrap_err());
    }

    #[tokio::test]
    async fn patch_reports_every_invalid_field() {
        let svc = service();
        let todo = svc.create(create_input(json!("Todo"))).await.unwrap();
        let err = svc
            .patch(&todo.id.to_string(), patch_input(json!({ "title": 123, "completed": "true" })))
            .await
            .unwrap_err();
        let fields = invalid_fields(err);
        assert_eq!(fields["title"], "must be a string");
        assert_eq!(fields["completed"], "must be a boolean");
    }

    #[tokio::test]
    async fn patch_rejects_empty_title_after_trim() {
        let svc = service();
        let todo = svc.create(create_input(json!("Todo"))).await.unwrap();
        for title in ["", "   "] {
            let err = svc
                .patch(&todo.id.to_string(), patch_input(json!({ "title": title })))
                .await
                .unwrap_err();
            assert_eq!(invalid_fields(err)["title"], "cannot be an empty string");
        }
    }

    #[tokio::test]
    async fn patch_validation_precedes_lookup() {
        let err = service()
            .patch("5b72ecfdbf16f1384b053639", patch_input(json!({ "completed": "yes" })))
            .await
            .unwrap_err();
        assert_eq!(invalid_fields(err)["completed"], "must be a boolean");
    }

    #[tokio::test]
    async fn patch_is_partial() {
        let svc = service();
        let todo = svc.create(create_input(json!("My Todo"))).await.unwrap();
        let id = todo.id.to_string();

        let v2 = svc.patch(&id, patch_input(json!({ "completed": true }))).await.unwrap();
        assert_eq!(v2.title, "My Todo");
        assert!(v2.completed);

        let v3 = svc
            .patch(&id, patch_input(json!({ "title": " Updated Title " })))
            .await
            .unwrap();
        assert_eq!(v3.title, "Updated Title");
        assert!(v3.completed);
        assert_eq!(v3.created_at, todo.created_at);
        assert!(v3.updated_at > todo.updated_at);
    }

    #[tokio::test]
    async fn patch_null_fields_are_ignored() {
        let svc = service();
        let todo = svc.create(create_input(json!("Keep"))).await.unwrap();
        let patched = svc
            .patch(&todo.id.to_string(), patch_input(json!({ "title": null, "completed": null })))
            .await
            .unwrap();
        assert_eq!(patched.title, "Keep");
        assert!(!patched.completed);
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let svc = service();
        let todo = svc.create(create_input(json!("Bye"))).await.unwrap();
        let id = todo.id.to_string();

        svc.delete(&id).await.unwrap();
        assert!(svc.store().find(&todo.id).await.unwrap().is_none());
        assert_not_found(svc.delete(&id).await.unwrap_err());
        assert_not_found(svc.delete("not-an-id").await.unwrap_err());
    }
}
