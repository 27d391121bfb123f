//! Authoritative in-memory task collection and the rules for merging remote
//! responses into it.

use std::sync::Arc;

use shared::{
    domain::{Task, TaskId},
    error::{TaskError, TaskResult},
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{connect, ClientConfig, TaskApi, DEFAULT_INITIAL_FETCH_LIMIT};

/// Ordered tasks with unique ids. Insertion order is the default display
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    /// Keeps the first `limit` remote entries; a repeated id replaces the
    /// earlier entry in place.
    pub fn from_remote(tasks: Vec<Task>, limit: usize) -> Self {
        let mut collection = Self::default();
        for task in tasks.into_iter().take(limit) {
            collection.upsert(task);
        }
        collection
    }

    /// Appends `task`, or replaces the entry that already carries its id.
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert(&mut self, task: Task) -> bool {
        match self.position(task.id) {
            Some(index) => {
                self.tasks[index] = task;
                true
            }
            None => {
                self.tasks.push(task);
                false
            }
        }
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.position(id).is_some()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Single owner of the session's [`TaskCollection`].
///
/// The collection lock is only taken after a remote call has resolved, so
/// concurrent callers interleave at the await point and the later response
/// wins.
pub struct TaskStore<A> {
    api: A,
    tasks: RwLock<TaskCollection>,
    initial_fetch_limit: usize,
}

impl TaskStore<Arc<dyn TaskApi>> {
    /// Store over the service [`connect`] selects, with the configured
    /// initial fetch limit.
    pub fn from_config(config: &ClientConfig) -> TaskResult<Self> {
        Ok(Self::with_fetch_limit(
            connect(config)?,
            config.initial_fetch_limit,
        ))
    }
}

impl<A: TaskApi> TaskStore<A> {
    pub fn new(api: A) -> Self {
        Self::with_fetch_limit(api, DEFAULT_INITIAL_FETCH_LIMIT)
    }

    pub fn with_fetch_limit(api: A, initial_fetch_limit: usize) -> Self {
        Self {
            api,
            tasks: RwLock::new(TaskCollection::default()),
            initial_fetch_limit,
        }
    }

    /// Replaces the collection with the first page of remote tasks. On
    /// failure the collection is left untouched.
    pub async fn initialize(&self) -> TaskResult<usize> {
        let remote = self.api.list().await?;
        let fetched = remote.len();
        let collection = TaskCollection::from_remote(remote, self.initial_fetch_limit);
        let kept = collection.len();
        *self.tasks.write().await = collection;
        info!(fetched, kept, "task store initialized");
        Ok(kept)
    }

    /// Creates the task remotely and appends the server's version.
    pub async fn add_task(&self, title: &str, description: &str) -> TaskResult<Task> {
        let created = self.api.create(title, description).await?;
        let mut tasks = self.tasks.write().await;
        if tasks.upsert(created.clone()) {
            warn!(
                task_id = created.id.0,
                "server reused an existing task id; replaced local entry"
            );
        }
        info!(task_id = created.id.0, "task added");
        Ok(created)
    }

    /// Overwrites only `completed` with the value the server echoed. Every
    /// other local field survives, including unsynced local edits.
    pub async fn set_completion(&self, id: TaskId, completed: bool) -> TaskResult<Task> {
        if !self.tasks.read().await.contains(id) {
            return Err(TaskError::NotFound(id));
        }

        let echo = self.api.update_completion(id, completed).await?;

        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(id).ok_or(TaskError::NotFound(id))?;
        task.completed = echo.completed;
        info!(task_id = id.0, completed = echo.completed, "task completion merged");
        Ok(task.clone())
    }

    /// Local-only edit: no remote request is issued for title/description.
    pub async fn edit_task_locally(
        &self,
        id: TaskId,
        title: &str,
        description: &str,
    ) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(id).ok_or(TaskError::NotFound(id))?;
        task.title = title.to_string();
        task.description = description.to_string();
        info!(task_id = id.0, "task edited locally");
        Ok(task.clone())
    }

    pub async fn remove_task(&self, id: TaskId) -> TaskResult<Task> {
        if !self.tasks.read().await.contains(id) {
            return Err(TaskError::NotFound(id));
        }

        self.api.delete(id).await?;

        let removed = self
            .tasks
            .write()
            .await
            .remove(id)
            .ok_or(TaskError::NotFound(id))?;
        info!(task_id = id.0, "task removed");
        Ok(removed)
    }

    pub async fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    pub async fn snapshot(&self) -> Vec<Task> {
        self.tasks.read().await.as_slice().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
