use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{StorageError, TodoRepository};
use crate::model::TodoItem;

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    orders: i32,
    creation_date: DateTime<Utc>,
}

impl From<TodoRow> for TodoItem {
    fn from(row: TodoRow) -> Self {
        Self {
            id: Some(row.id),
            title: row.title,
            completed: row.completed,
            order: row.orders,
            creation_date: row.creation_date,
        }
    }
}

/// SQLite-backed store. Ids come from the `INTEGER PRIMARY KEY AUTOINCREMENT`
/// column, so they are never reused.
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Open (creating if needed) the database at `database_url` and make sure
    /// the `todos` table exists.
    ///
    /// An in-memory URL gets a single connection that is never recycled:
    /// every SQLite connection to `:memory:` sees its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        let repository = Self { pool };
        repository.initialize_schema().await?;

        info!(database_url, "todo storage ready");
        Ok(repository)
    }

    async fn initialize_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT 0,
                orders INTEGER NOT NULL DEFAULT 0,
                creation_date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl TodoRepository for SqliteTodoRepository {
    async fn save(&self, item: TodoItem) -> Result<TodoItem, StorageError> {
        // The written row comes back from the same statement, so a concurrent
        // delete cannot sit between the write and the read.
        let row = match item.id {
            None => sqlx::query_as::<_, TodoRow>(
                r#"
                INSERT INTO todos (title, completed, orders, creation_date)
                VALUES (?, ?, ?, ?)
                RETURNING id, title, completed, orders, creation_date
                "#,
            )
            .bind(item.title.as_str())
            .bind(item.completed)
            .bind(item.order)
            .bind(item.creation_date)
            .fetch_one(&self.pool)
            .await?,
            Some(id) => sqlx::query_as::<_, TodoRow>(
                r#"
                INSERT INTO todos (id, title, completed, orders, creation_date)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    completed = excluded.completed,
                    orders = excluded.orders
                RETURNING id, title, completed, orders, creation_date
                "#,
            )
            .bind(id)
            .bind(item.title.as_str())
            .bind(item.completed)
            .bind(item.order)
            .bind(item.creation_date)
            .fetch_one(&self.pool)
            .await?,
        };
        debug!(id = row.id, "todo row written");

        Ok(TodoItem::from(row))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>, StorageError> {
        let row = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, completed, orders, creation_date FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TodoItem::from))
    }

    async fn find_all(&self) -> Result<Vec<TodoItem>, StorageError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, completed, orders, creation_date FROM todos",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TodoItem::from).collect())
    }

    async fn delete(&self, item: &TodoItem) -> Result<(), StorageError> {
        let id = item.id.ok_or(StorageError::MissingId)?;
        sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(())
    }
}
