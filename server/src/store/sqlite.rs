//! SQLite-backed todo store.
//!
//! Uses rusqlite with WAL mode. Every call runs on `spawn_blocking` while
//! holding the connection lock, so each store operation is one atomic step.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{Todo, TodoChanges, TodoDraft};
use crate::object_id::ObjectId;

const COLUMNS: &str = "id, title, completed, created_at, updated_at";

/// Thread-safe handle to a SQLite todo database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self::from_connection(conn)?;

        tracing::info!(path = %path.display(), "sqlite todo store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS todos (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                completed   INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&conn)
        })
        .await?
    }
}

/// A row as stored, before timestamps and id are parsed.
struct RawTodo {
    id: String,
    title: String,
    completed: bool,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawTodo> {
    Ok(RawTodo {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl RawTodo {
    fn into_todo(self) -> Result<Todo, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: self.id.clone(),
            reason,
        };
        let id = ObjectId::parse_str(&self.id).map_err(|e| corrupt(e.to_string()))?;
        let parse_time = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| corrupt(format!("bad timestamp {s:?}: {e}")))
        };
        let created_at = parse_time(&self.created_at)?;
        let updated_at = parse_time(&self.updated_at)?;
        Ok(Todo {
            id,
            title: self.title,
            completed: self.completed,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM todos ORDER BY id ASC"))?;
            let rows = stmt
                .query_map([], read_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(RawTodo::into_todo).collect()
        })
        .await
    }

    async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        self.with_conn(move |conn| {
            let todo = Todo::from_draft(ObjectId::new(), draft);
            conn.execute(
                "INSERT INTO todos (id, title, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    todo.id.to_string(),
                    todo.title,
                    todo.completed,
                    format_time(&todo.created_at),
                    format_time(&todo.updated_at),
                ],
            )?;
            Ok(todo)
        })
        .await
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Todo>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"),
                [id],
                read_row,
            )
            .optional()?
            .map(RawTodo::into_todo)
            .transpose()
        })
        .await
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE todos SET
                        title = COALESCE(?2, title),
                        completed = COALESCE(?3, completed),
                        updated_at = ?4
                     WHERE id = ?1
                     RETURNING {COLUMNS}"
                ),
                rusqlite::params![
                    id,
                    changes.title,
                    changes.completed,
                    format_time(&changes.updated_at),
                ],
                read_row,
            )
            .optional()?
            .map(RawTodo::into_todo)
            .transpose()
        })
        .await
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM todos WHERE id = ?1", [id])?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM todos", [])?;
            Ok(deleted as u64)
        })
        .await
    }
}
