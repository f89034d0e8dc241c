//! REST API for a list of short text todos.
//!
//! # Overview
//! `GET/POST /todos` and `PATCH/DELETE /todos/{id}`, JSON in and out. Input
//! is validated and trimmed by `TodoService`; records live behind the
//! `TodoStore` trait (in memory or SQLite).
//!
//! # Design
//! - `app` assembles the router, the CORS/method gate, and request tracing
//!   around a store handle. Tests drive it directly with `tower::ServiceExt`.
//! - `run` / `serve` bind it to a listener; the binary adds config parsing
//!   and the tracing subscriber.

pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod object_id;
pub mod routes;
pub mod service;
pub mod store;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::{ResourceNotFoundError, StoreError, TodoError, ValidationError};
pub use model::Todo;
pub use object_id::ObjectId;
pub use service::TodoService;
pub use store::{MemoryStore, SqliteStore, TodoStore};

pub fn app(store: Arc<dyn TodoStore>) -> Router {
    routes::router(TodoService::new(store))
        .layer(axum::middleware::from_fn(middleware::cors_and_method_gate))
        .layer(TraceLayer::new_for_http())
}

/// Serve until the process exits.
pub async fn run(listener: TcpListener, store: Arc<dyn TodoStore>) -> Result<(), std::io::Error> {
    serve(listener, store, std::future::pending()).await
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    store: Arc<dyn TodoStore>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Install the global `tracing` subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,tower_http=info".into()),
        )
        .init();
}
