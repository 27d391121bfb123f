//! UI events and error modeling for the interaction controller.

use client_core::SortCriterion;
use shared::{
    domain::{Task, TaskId},
    error::{ErrorCode, TaskError, TaskResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    FormTitleChanged(String),
    FormDescriptionChanged(String),
    FormSubmitted,
    SearchChanged(String),
    SortChanged(SortCriterion),
    CompletionToggled { id: TaskId, completed: bool },
    EditRequested(TaskId),
    DeleteRequested(TaskId),
}

/// Result of a store call that ran off the event loop.
#[derive(Debug)]
pub enum StoreOutcome {
    Loaded(TaskResult<usize>),
    Changed {
        context: UiErrorContext,
        result: TaskResult<Task>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    InitialLoad,
    FormValidation,
    AddTask,
    UpdateStatus,
    EditTask,
    DeleteTask,
}

impl UiErrorContext {
    fn failure_message(self) -> &'static str {
        match self {
            Self::InitialLoad => "Failed to fetch tasks",
            Self::FormValidation => "Title and description are required.",
            Self::AddTask => "Failed to add task",
            Self::UpdateStatus => "Failed to update task status",
            Self::EditTask => "Failed to edit task",
            Self::DeleteTask => "Failed to delete task",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    context: UiErrorContext,
    code: ErrorCode,
    message: String,
}

impl UiError {
    pub fn validation() -> Self {
        let context = UiErrorContext::FormValidation;
        Self {
            context,
            code: ErrorCode::Validation,
            message: context.failure_message().to_string(),
        }
    }

    pub fn from_task_error(context: UiErrorContext, err: &TaskError) -> Self {
        let message = match err {
            TaskError::NotFound(_) => "Task not found".to_string(),
            TaskError::Validation(detail) => detail.clone(),
            TaskError::Transport { .. } | TaskError::Decode(_) => {
                context.failure_message().to_string()
            }
        };
        Self {
            context,
            code: err.code(),
            message,
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
