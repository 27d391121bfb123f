use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use shared::{
    domain::{Task, TaskId, UserId},
    error::{TaskError, TaskResult},
    protocol::CompletionEcho,
};

pub mod remote;
pub mod store;
pub mod view;

pub use remote::RemoteTaskClient;
pub use store::{TaskCollection, TaskStore};
pub use view::{project, SortCriterion, ViewState};

pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/todos";
/// Owner id stamped on every task this client creates.
pub const DEFAULT_USER_ID: UserId = UserId(1);
pub const DEFAULT_INITIAL_FETCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub user_id: UserId,
    pub initial_fetch_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            user_id: DEFAULT_USER_ID,
            initial_fetch_limit: DEFAULT_INITIAL_FETCH_LIMIT,
        }
    }
}

/// Picks the task service for `config`: the HTTP client when an endpoint is
/// configured, [`MissingTaskApi`] when `api_url` is blank.
pub fn connect(config: &ClientConfig) -> TaskResult<Arc<dyn TaskApi>> {
    if config.api_url.trim().is_empty() {
        warn!("no task api url configured; remote operations will fail");
        return Ok(Arc::new(MissingTaskApi));
    }
    Ok(Arc::new(RemoteTaskClient::new(config)?))
}

/// Remote task service contract. Implementations never retry and never
/// swallow failures.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> TaskResult<Vec<Task>>;
    async fn create(&self, title: &str, description: &str) -> TaskResult<Task>;
    async fn update_completion(&self, id: TaskId, completed: bool) -> TaskResult<CompletionEcho>;
    async fn delete(&self, id: TaskId) -> TaskResult<()>;
}

#[async_trait]
impl<T> TaskApi for Arc<T>
where
    T: TaskApi + ?Sized,
{
    async fn list(&self) -> TaskResult<Vec<Task>> {
        (**self).list().await
    }

    async fn create(&self, title: &str, description: &str) -> TaskResult<Task> {
        (**self).create(title, description).await
    }

    async fn update_completion(&self, id: TaskId, completed: bool) -> TaskResult<CompletionEcho> {
        (**self).update_completion(id, completed).await
    }

    async fn delete(&self, id: TaskId) -> TaskResult<()> {
        (**self).delete(id).await
    }
}

pub struct MissingTaskApi;

#[async_trait]
impl TaskApi for MissingTaskApi {
    async fn list(&self) -> TaskResult<Vec<Task>> {
        Err(TaskError::transport(None, "task service is unavailable"))
    }

    async fn create(&self, _title: &str, _description: &str) -> TaskResult<Task> {
        Err(TaskError::transport(None, "task service is unavailable"))
    }

    async fn update_completion(
        &self,
        id: TaskId,
        _completed: bool,
    ) -> TaskResult<CompletionEcho> {
        Err(TaskError::transport(
            None,
            format!("task service is unavailable for task {id}"),
        ))
    }

    async fn delete(&self, id: TaskId) -> TaskResult<()> {
        Err(TaskError::transport(
            None,
            format!("task service is unavailable for task {id}"),
        ))
    }
}
