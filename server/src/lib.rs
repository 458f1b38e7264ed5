//! HTTP service for a todo list.
//!
//! # Overview
//! Three layers per request: axum handlers (`handlers`, `routes`) validate
//! and translate HTTP, `TodoService` runs one CRUD operation (including
//! RFC 6902 partial updates), and a `TodoRepository` stores rows by integer
//! id. SQLite backs the binary; an in-memory store backs tests.
//!
//! # Design
//! - The service is generic over the repository, so handlers and router are
//!   too; there is no global state.
//! - Response `url`s are built from the request's own host, passed down
//!   explicitly through the `BaseUrl` extractor.
//! - Errors are typed (`TodoError`) and mapped to status codes in one place.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod service;
pub mod storage;
pub mod validation;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;

pub use config::Config;
pub use error::{ErrorResponse, TodoError};
pub use model::{TodoInput, TodoItem, TodoItemRepresentation};
pub use service::TodoService;
pub use storage::{InMemoryTodoRepository, SqliteTodoRepository, StorageError, TodoRepository};

/// Router over a fresh in-memory store.
pub fn app() -> Router {
    routes::router(TodoService::new(InMemoryTodoRepository::new()))
}

pub async fn run<R: TodoRepository>(
    listener: TcpListener,
    service: TodoService<R>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, routes::router(service)).await
}

/// Like [`run`], returning once `shutdown` resolves and in-flight requests
/// have finished.
pub async fn run_until<R, F>(
    listener: TcpListener,
    service: TodoService<R>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    R: TodoRepository,
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, routes::router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
