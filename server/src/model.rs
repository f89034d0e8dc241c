//! Todo records and the raw request payloads that produce them.
//!
//! # Design
//! Request payloads keep every field as an untyped `serde_json::Value` so the
//! service can tell "absent" from "present but the wrong type" and report each
//! violation by name. `null` deserializes to `None`, the same as an absent key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::object_id::ObjectId;

/// A stored todo as returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "_id", alias = "id")]
    pub id: ObjectId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /todos`. Only `title` is read.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: Option<Value>,
}

/// Body of `PATCH /todos/:id`. Only the supplied fields are considered.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub completed: Option<Value>,
}

/// A validated todo ready to be inserted. The store assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct TodoDraft {
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated partial update. `None` fields are left untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn from_draft(id: ObjectId, draft: TodoDraft) -> Self {
        Self {
            id,
            title: draft.title,
            completed: draft.completed,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        }
    }

    pub fn apply(&mut self, changes: &TodoChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        self.updated_at = changes.updated_at;
    }
}
