//! Required-field checks for create/update bodies.

use crate::error::TodoError;
use crate::model::{TodoInput, TodoPayload};

/// Turn a raw body into a `TodoInput`, rejecting a missing or null `title`.
/// `completed` and `order` fall back to `false` and `0`.
pub fn validate_todo_input(payload: TodoPayload) -> Result<TodoInput, TodoError> {
    let title = payload
        .title
        .ok_or_else(|| TodoError::validation("title", "cannot be null"))?;

    Ok(TodoInput {
        title,
        completed: payload.completed.unwrap_or(false),
        order: payload.order.unwrap_or(0),
    })
}
