use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{StorageError, TodoRepository};
use crate::model::TodoItem;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, TodoItem>,
    last_id: i64,
}

/// Process-local store. Ids start at 1 and are never reused, even after
/// `delete_all`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    async fn save(&self, mut item: TodoItem) -> Result<TodoItem, StorageError> {
        let mut table = self.table.write().await;
        let id = match item.id {
            Some(id) => {
                table.last_id = table.last_id.max(id);
                id
            }
            None => {
                table.last_id += 1;
                table.last_id
            }
        };
        item.id = Some(id);
        if let Some(existing) = table.rows.get(&id) {
            item.creation_date = existing.creation_date;
        }
        table.rows.insert(id, item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>, StorageError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<TodoItem>, StorageError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn delete(&self, item: &TodoItem) -> Result<(), StorageError> {
        let id = item.id.ok_or(StorageError::MissingId)?;
        self.table.write().await.rows.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StorageError> {
        self.table.write().await.rows.clear();
        Ok(())
    }
}
