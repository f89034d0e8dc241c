//! Process configuration, from flags or the environment.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::error::StoreError;
use crate::store::{MemoryStore, SqliteStore, TodoStore};

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", version, about = "REST API for a list of todos")]
pub struct Config {
    /// Interface to bind.
    #[arg(long, env = "TODO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file. Todos are kept in memory when unset.
    #[arg(long, env = "TODO_DB")]
    pub db: Option<PathBuf>,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn open_store(&self) -> Result<Arc<dyn TodoStore>, StoreError> {
        let store: Arc<dyn TodoStore> = match &self.db {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}
