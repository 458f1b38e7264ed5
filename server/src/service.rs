//! One method per todo operation, written against `TodoRepository`.
//!
//! # Design
//! The service converts between payloads, stored items and representations,
//! and raises `TodoError::NotFound` when an id is unknown. It never knows the
//! request's base URL: every representation it returns carries an empty
//! `url` that the HTTP layer fills in.
//!
//! Partial updates serialize the stored item to a `TodoDocument`, apply the
//! JSON Patch to that detached value, then read it back and re-validate it.
//! Storage is only written once all of that has succeeded.

use json_patch::Patch;
use tracing::{debug, warn};

use crate::error::TodoError;
use crate::model::{TodoDocument, TodoInput, TodoItem, TodoItemRepresentation};
use crate::storage::{StorageError, TodoRepository};
use crate::validation::validate_todo_input;

#[derive(Debug, Clone)]
pub struct TodoService<R> {
    repository: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn add_todo(&self, input: TodoInput) -> Result<TodoItemRepresentation, TodoError> {
        let saved = self.repository.save(TodoItem::new(input)).await?;
        debug!(id = ?saved.id, "todo created");
        render(&saved)
    }

    pub async fn retrieve_one_todo(&self, id: i64) -> Result<TodoItemRepresentation, TodoError> {
        let item = self.find_existing(id).await?;
        render(&item)
    }

    /// Every stored todo, sorted by id.
    pub async fn retrieve_all_todos(&self) -> Result<Vec<TodoItemRepresentation>, TodoError> {
        let mut items = self.repository.find_all().await?;
        items.sort_by_key(|item| item.id);
        items.iter().map(render).collect()
    }

    /// Replace title, completed and order of an existing todo.
    pub async fn update_all_fields_of_todo(
        &self,
        id: i64,
        input: TodoInput,
    ) -> Result<TodoItemRepresentation, TodoError> {
        let existing = self.find_existing(id).await?;
        let saved = self.repository.save(existing.replaced_by(input)).await?;
        debug!(id, "todo replaced");
        render(&saved)
    }

    /// Apply an RFC 6902 patch to an existing todo.
    pub async fn patch_todo(
        &self,
        id: i64,
        patch: &Patch,
    ) -> Result<TodoItemRepresentation, TodoError> {
        let existing = self.find_existing(id).await?;
        let patched = apply_patch(id, &existing, patch).inspect_err(|err| {
            warn!(id, error = %err, "patch rejected");
        })?;
        let saved = self.repository.save(patched).await?;
        debug!(id, operations = patch.0.len(), "todo patched");
        render(&saved)
    }

    pub async fn remove_todo(&self, id: i64) -> Result<(), TodoError> {
        let existing = self.find_existing(id).await?;
        self.repository.delete(&existing).await?;
        debug!(id, "todo removed");
        Ok(())
    }

    pub async fn remove_all_todos(&self) -> Result<(), TodoError> {
        self.repository.delete_all().await?;
        debug!("all todos removed");
        Ok(())
    }

    async fn find_existing(&self, id: i64) -> Result<TodoItem, TodoError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            warn!(id, "todo not found");
            TodoError::NotFound(id)
        })
    }
}

fn render(item: &TodoItem) -> Result<TodoItemRepresentation, TodoError> {
    let id = item.id.ok_or(StorageError::MissingId)?;
    Ok(TodoItemRepresentation::new(id, item))
}

/// Patch a detached document view of `existing`. The result keeps the path
/// id and the original creation date whatever the patch did to `/id`.
fn apply_patch(id: i64, existing: &TodoItem, patch: &Patch) -> Result<TodoItem, TodoError> {
    let mut document =
        serde_json::to_value(TodoDocument::new(id, existing)).map_err(TodoError::patch)?;
    json_patch::patch(&mut document, &patch.0).map_err(TodoError::patch)?;

    let document: TodoDocument = serde_json::from_value(document).map_err(TodoError::patch)?;
    let input = validate_todo_input(document.into_payload()).map_err(TodoError::patch)?;

    let mut patched = existing.replaced_by(input);
    patched.id = Some(id);
    Ok(patched)
}
