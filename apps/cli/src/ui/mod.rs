//! Capabilities the controller renders through, plus the add-task form state.

pub mod terminal;

use async_trait::async_trait;
use shared::domain::Task;

/// Re-renders the visible list wholesale.
pub trait TaskRenderer {
    fn render(&mut self, tasks: &[Task]);
    fn set_loading(&mut self, loading: bool);
}

/// Single region holding the most recent error or validation message.
pub trait ErrorSurface {
    fn show(&mut self, message: &str);
    fn clear(&mut self);
}

/// Interactive text prompt. `None` means the user cancelled.
#[async_trait]
pub trait TextPrompt: Send {
    async fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
}

impl TaskForm {
    /// Both fields must hold something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
