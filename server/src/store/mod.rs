//! Storage backends for todos.
//!
//! `TodoStore` is the narrow seam between the service and whatever holds the
//! records. Each method is a single-document operation and must be atomic on
//! its own; the service never composes two calls into one logical update.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Todo, TodoChanges, TodoDraft};
use crate::object_id::ObjectId;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, ascending by id.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    /// Persist a new todo and return it with its assigned id.
    async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError>;

    async fn find(&self, id: &ObjectId) -> Result<Option<Todo>, StoreError>;

    /// Apply `changes` to the matching todo and return the updated record,
    /// or `None` when nothing matched.
    async fn update(&self, id: &ObjectId, changes: TodoChanges)
        -> Result<Option<Todo>, StoreError>;

    /// Remove the matching todo, returning how many records were deleted.
    async fn delete(&self, id: &ObjectId) -> Result<u64, StoreError>;

    /// Remove every todo. Used to reset state between tests.
    async fn clear(&self) -> Result<u64, StoreError>;
}
