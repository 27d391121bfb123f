//! Typed wrapper over the remote task endpoint.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Task, TaskId, UserId},
    error::{TaskError, TaskResult},
    protocol::{CompletionEcho, CompletionPatch, NewTaskRequest},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{ClientConfig, TaskApi};

pub struct RemoteTaskClient {
    http: Client,
    base_url: String,
    user_id: UserId,
}

impl RemoteTaskClient {
    pub fn new(config: &ClientConfig) -> TaskResult<Self> {
        Self::with_http(Client::new(), config)
    }

    pub fn with_http(http: Client, config: &ClientConfig) -> TaskResult<Self> {
        let base_url = normalize_base_url(&config.api_url)?;
        Ok(Self {
            http,
            base_url,
            user_id: config.user_id,
        })
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/{id}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> TaskResult<Response> {
        let response = request.send().await.map_err(|err| {
            warn!("{context}: request failed: {err}");
            TaskError::transport(err.status().map(|s| s.as_u16()), format!("{context}: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "{context}: unsuccessful response");
            return Err(TaskError::transport(Some(status.as_u16()), context));
        }
        Ok(response)
    }

    /// Like [`Self::send`], but a 404 means the task does not exist remotely.
    async fn send_for_task(
        &self,
        id: TaskId,
        request: RequestBuilder,
        context: &str,
    ) -> TaskResult<Response> {
        match self.send(request, context).await {
            Err(TaskError::Transport {
                status: Some(status),
                ..
            }) if status == StatusCode::NOT_FOUND.as_u16() => Err(TaskError::NotFound(id)),
            other => other,
        }
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response, context: &str) -> TaskResult<T> {
    let body = response
        .bytes()
        .await
        .map_err(|err| TaskError::transport(None, format!("{context}: {err}")))?;
    serde_json::from_slice(&body).map_err(|err| TaskError::Decode(format!("{context}: {err}")))
}

fn normalize_base_url(raw: &str) -> TaskResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed)
        .map_err(|err| TaskError::Validation(format!("invalid task api url '{raw}': {err}")))?;
    Ok(trimmed.to_string())
}

#[async_trait]
impl TaskApi for RemoteTaskClient {
    async fn list(&self) -> TaskResult<Vec<Task>> {
        let response = self
            .send(self.http.get(&self.base_url), "GET tasks")
            .await?;
        let tasks: Vec<Task> = decode_json(response, "GET tasks").await?;
        debug!(count = tasks.len(), "fetched remote tasks");
        Ok(tasks)
    }

    async fn create(&self, title: &str, description: &str) -> TaskResult<Task> {
        let body = NewTaskRequest::new(title, description, self.user_id);
        let response = self
            .send(self.http.post(&self.base_url).json(&body), "POST task")
            .await?;
        let task: Task = decode_json(response, "POST task").await?;
        info!(task_id = task.id.0, "remote task created");
        Ok(task)
    }

    async fn update_completion(&self, id: TaskId, completed: bool) -> TaskResult<CompletionEcho> {
        let response = self
            .send_for_task(
                id,
                self.http
                    .patch(self.task_url(id))
                    .json(&CompletionPatch { completed }),
                "PATCH task",
            )
            .await?;
        let echo: CompletionEcho = decode_json(response, "PATCH task").await?;
        info!(task_id = id.0, completed = echo.completed, "remote completion updated");
        Ok(echo)
    }

    async fn delete(&self, id: TaskId) -> TaskResult<()> {
        self.send_for_task(id, self.http.delete(self.task_url(id)), "DELETE task")
            .await?;
        info!(task_id = id.0, "remote task deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
