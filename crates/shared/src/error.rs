use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    Decode,
    NotFound,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Non-success HTTP status, or no response at all (`status` is `None`).
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("{0}")]
    Validation(String),
}

impl TaskError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::Transport,
            Self::Decode(_) => ErrorCode::Decode,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::Validation,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|status| format!(" (status {status})"))
        .unwrap_or_default()
}

pub type TaskResult<T> = Result<T, TaskError>;
