//! Entity model and wire DTOs for the todo service.
//!
//! # Design
//! `TodoItem` is both the persisted shape and the wire shape. Ids at or above
//! zero are authoritative (server- or id-source-assigned); negative ids are
//! temporary placeholders minted by the optimistic sync layer and never leave
//! the client.

use serde::{Deserialize, Serialize};

/// Identifier of a todo item.
pub type TodoId = i64;

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Creation time in milliseconds since the Unix epoch. Only used for
    /// ordering; never changes after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl TodoItem {
    /// True for placeholder ids handed out before the server has answered.
    pub fn is_temporary(&self) -> bool {
        self.id < 0
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating an existing todo. The id selects the item;
/// only the fields present in the JSON are applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    pub id: TodoId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl From<&TodoItem> for UpdateTodo {
    fn from(item: &TodoItem) -> Self {
        Self {
            id: item.id,
            title: Some(item.title.clone()),
            completed: Some(item.completed),
        }
    }
}

/// Body of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAck {
    pub success: bool,
}

/// Body of every 4xx response from the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
