use serde::{Deserialize, Serialize};

use crate::domain::{TaskId, UserId};

/// Body of the create request. New tasks always start incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub user_id: UserId,
}

impl NewTaskRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>, user_id: UserId) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            completed: false,
            user_id,
        }
    }
}

/// Partial update carrying only the completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPatch {
    pub completed: bool,
}

/// What the service echoes back for a completion patch.
///
/// Only `completed` is guaranteed; the remaining fields are whatever the
/// service's partial representation happens to retain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEcho {
    pub completed: bool,
    #[serde(default)]
    pub id: Option<TaskId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}
