use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{Todo, TodoChanges, TodoDraft};
use crate::object_id::ObjectId;

/// In-process store keyed by id. The map's ordering is the listing order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    todos: Arc<RwLock<BTreeMap<ObjectId, Todo>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos.values().cloned().collect())
    }

    async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        let mut todos = self.todos.write().await;
        let todo = Todo::from_draft(ObjectId::new(), draft);
        todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos.get(id).cloned())
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(id).map(|todo| {
            todo.apply(&changes);
            todo.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.remove(id).map_or(0, |_| 1))
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut todos = self.todos.write().await;
        let count = todos.len() as u64;
        todos.clear();
        Ok(count)
    }
}
