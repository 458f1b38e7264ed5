//! Record storage keyed by integer id.
//!
//! # Design
//! The service depends only on `TodoRepository`, so the same domain code runs
//! against SQLite in the binary and against `InMemoryTodoRepository` in
//! tests. Each call touches a single row (or clears the table) and is atomic
//! on its own; there are no multi-row transactions.

mod memory;
mod sqlite;

use std::future::Future;

use thiserror::Error;

use crate::model::TodoItem;

pub use memory::InMemoryTodoRepository;
pub use sqlite::SqliteTodoRepository;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend handed back a row without an identifier.
    #[error("stored todo has no id")]
    MissingId,
}

/// CRUD-by-id contract the service is written against.
///
/// Implementations must be shareable across concurrently running requests.
pub trait TodoRepository: Send + Sync + 'static {
    /// Insert when `item.id` is `None`, otherwise insert-or-replace the row
    /// with that id. Returns the stored item, id included. An existing row
    /// keeps its original `creation_date`.
    fn save(&self, item: TodoItem) -> impl Future<Output = Result<TodoItem, StorageError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<TodoItem>, StorageError>> + Send;

    /// Every stored item. Order is unspecified.
    fn find_all(&self) -> impl Future<Output = Result<Vec<TodoItem>, StorageError>> + Send;

    /// Remove the row backing `item`. A missing row is not an error.
    fn delete(&self, item: &TodoItem) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn delete_all(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}
