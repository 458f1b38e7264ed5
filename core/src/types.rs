//! Wire DTOs of the todo API.
//!
//! These mirror the server's JSON but are defined independently, so the
//! client carries no server dependencies. The integration test catches drift.

use serde::{Deserialize, Serialize};

/// A todo as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub order: i32,
    pub url: String,
}

/// Body of a create (POST) or full update (PUT). A PUT replaces every field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: i32,
}

impl TodoInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
            order: 0,
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// One RFC 6902 operation. Paths are JSON Pointers into
/// `{"id", "title", "completed", "order"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: serde_json::Value },
    Remove { path: String },
    Replace { path: String, value: serde_json::Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: serde_json::Value },
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        PatchOperation::Replace {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn test(path: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        PatchOperation::Test {
            path: path.into(),
            value: value.into(),
        }
    }
}
