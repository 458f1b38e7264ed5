//! Todo entity, request payloads and the wire/patch views built from it.
//!
//! # Design
//! `TodoItem` is the stored shape and never crosses the wire directly: its
//! `creation_date` stays server-side and its `id` is optional until storage
//! assigns one. Responses go out as `TodoItemRepresentation`, whose `url` is
//! filled in by the transport layer from the request's base URL. Partial
//! updates work on `TodoDocument`, the JSON view a patch is applied against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A todo as held by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoItem {
    pub id: Option<i64>,
    pub title: String,
    pub completed: bool,
    pub order: i32,
    pub creation_date: DateTime<Utc>,
}

impl TodoItem {
    /// Build an unsaved item stamped with the current time.
    pub fn new(input: TodoInput) -> Self {
        Self {
            id: None,
            title: input.title,
            completed: input.completed,
            order: input.order,
            creation_date: Utc::now(),
        }
    }

    /// Overwrite every client-editable field, keeping `id` and `creation_date`.
    pub fn replaced_by(&self, input: TodoInput) -> Self {
        Self {
            id: self.id,
            title: input.title,
            completed: input.completed,
            order: input.order,
            creation_date: self.creation_date,
        }
    }
}

/// A create/update payload after validation: `title` is guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    pub completed: bool,
    pub order: i32,
}

impl TodoInput {
    pub fn new(title: impl Into<String>, completed: bool, order: i32) -> Self {
        Self {
            title: title.into(),
            completed,
            order,
        }
    }
}

/// A create/update body as received. Every field is optional here so that a
/// missing or null `title` reaches the validator instead of failing inside
/// the JSON extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// The response shape of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItemRepresentation {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub order: i32,
    pub url: String,
}

impl TodoItemRepresentation {
    /// Representation with an empty `url`; see [`with_url`](Self::with_url).
    pub fn new(id: i64, item: &TodoItem) -> Self {
        Self {
            id,
            title: item.title.clone(),
            completed: item.completed,
            order: item.order,
            url: String::new(),
        }
    }

    /// Set `url` to `<base_url>/todos/<id>`.
    pub fn with_url(mut self, base_url: &str) -> Self {
        self.url = format!("{}/todos/{}", base_url.trim_end_matches('/'), self.id);
        self
    }
}

/// JSON view of a stored todo that partial updates are applied against.
///
/// Unknown keys are rejected on the way back in, so a patch that adds a
/// field the entity does not have fails instead of being silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub order: Option<i32>,
}

impl TodoDocument {
    pub fn new(id: i64, item: &TodoItem) -> Self {
        Self {
            id: Some(id),
            title: Some(item.title.clone()),
            completed: Some(item.completed),
            order: Some(item.order),
        }
    }

    pub fn into_payload(self) -> TodoPayload {
        TodoPayload {
            title: self.title,
            completed: self.completed,
            order: self.order,
        }
    }
}
