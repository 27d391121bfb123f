use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use client_core::MissingTaskApi;
use shared::{domain::UserId, protocol::CompletionEcho};
use tokio::{
    sync::{Mutex, Notify},
    time::timeout,
};

use super::*;

struct InMemoryTaskApi {
    remote: Mutex<Vec<Task>>,
    next_id: Mutex<i64>,
    fail_next: Mutex<Option<TaskError>>,
    calls: Mutex<Vec<&'static str>>,
    completion_gate: Option<Notify>,
}

impl InMemoryTaskApi {
    fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            remote: Mutex::new(tasks),
            next_id: Mutex::new(201),
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            completion_gate: None,
        }
    }

    /// Completion updates stay pending until [`Self::release_completion`].
    fn with_gated_completion(mut self) -> Self {
        self.completion_gate = Some(Notify::new());
        self
    }

    fn release_completion(&self) {
        if let Some(gate) = &self.completion_gate {
            gate.notify_one();
        }
    }

    async fn fail_next(&self, err: TaskError) {
        *self.fail_next.lock().await = Some(err);
    }

    async fn record(&self, call: &'static str) -> TaskResult<()> {
        self.calls.lock().await.push(call);
        match self.fail_next.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl TaskApi for InMemoryTaskApi {
    async fn list(&self) -> TaskResult<Vec<Task>> {
        self.record("list").await?;
        Ok(self.remote.lock().await.clone())
    }

    async fn create(&self, title: &str, description: &str) -> TaskResult<Task> {
        self.record("create").await?;
        let mut next_id = self.next_id.lock().await;
        let task = task(*next_id, title, false);
        let task = Task {
            description: description.to_string(),
            ..task
        };
        *next_id += 1;
        Ok(task)
    }

    async fn update_completion(&self, id: TaskId, completed: bool) -> TaskResult<CompletionEcho> {
        self.record("update_completion").await?;
        if let Some(gate) = &self.completion_gate {
            gate.notified().await;
        }
        Ok(CompletionEcho {
            completed,
            id: Some(id),
            title: None,
            description: None,
            user_id: None,
        })
    }

    async fn delete(&self, _id: TaskId) -> TaskResult<()> {
        self.record("delete").await
    }
}

#[derive(Default)]
struct RecordingRenderer {
    renders: Vec<Vec<Task>>,
    loading: Vec<bool>,
}

impl RecordingRenderer {
    fn last_ids(&self) -> Vec<i64> {
        self.renders
            .last()
            .map(|tasks| tasks.iter().map(|task| task.id.0).collect())
            .unwrap_or_default()
    }
}

impl TaskRenderer for RecordingRenderer {
    fn render(&mut self, tasks: &[Task]) {
        self.renders.push(tasks.to_vec());
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading.push(loading);
    }
}

#[derive(Default)]
struct RecordingErrors {
    visible: Option<String>,
}

impl ErrorSurface for RecordingErrors {
    fn show(&mut self, message: &str) {
        self.visible = Some(message.to_string());
    }

    fn clear(&mut self) {
        self.visible = None;
    }
}

#[derive(Default)]
struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    asked: Vec<(String, String)>,
}

impl ScriptedPrompt {
    fn answering(answers: impl IntoIterator<Item = Option<&'static str>>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|answer| answer.map(str::to_string))
                .collect(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl TextPrompt for ScriptedPrompt {
    async fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self.asked.push((message.to_string(), default.to_string()));
        self.answers.pop_front().flatten()
    }
}

type TestController =
    InteractionController<Arc<InMemoryTaskApi>, RecordingRenderer, RecordingErrors, ScriptedPrompt>;

fn task(id: i64, title: &str, completed: bool) -> Task {
    Task {
        id: TaskId(id),
        title: title.to_string(),
        description: format!("details {id}"),
        completed,
        user_id: UserId(1),
    }
}

async fn started_with(api: Arc<InMemoryTaskApi>, prompt: ScriptedPrompt) -> TestController {
    let store = Arc::new(TaskStore::new(api));
    let mut controller = InteractionController::new(
        store,
        RecordingRenderer::default(),
        RecordingErrors::default(),
        prompt,
    );
    controller.start();
    controller.process_next_outcome().await;
    controller
}

async fn started(tasks: Vec<Task>, prompt: ScriptedPrompt) -> (TestController, Arc<InMemoryTaskApi>) {
    let api = Arc::new(InMemoryTaskApi::with_tasks(tasks));
    let controller = started_with(api.clone(), prompt).await;
    (controller, api)
}

/// Handles an event that hands work to the store, then applies its outcome.
async fn handle_and_settle(controller: &mut TestController, event: UiEvent) {
    controller.handle(event).await;
    controller.process_next_outcome().await;
}

fn sample_tasks() -> Vec<Task> {
    vec![
        task(1, "Title A", true),
        task(2, "Other", false),
        task(3, "Another title", true),
    ]
}

async fn fill_form(controller: &mut TestController, title: &str, description: &str) {
    controller
        .handle(UiEvent::FormTitleChanged(title.to_string()))
        .await;
    controller
        .handle(UiEvent::FormDescriptionChanged(description.to_string()))
        .await;
}

#[tokio::test]
async fn start_renders_first_page_behind_loading_indicator() {
    let tasks = (1..=12).map(|id| task(id, "t", false)).collect();
    let (controller, _) = started(tasks, ScriptedPrompt::default()).await;

    assert_eq!(controller.renderer().loading, vec![true, false]);
    assert_eq!(controller.renderer().last_ids(), (1..=10).collect::<Vec<_>>());
    assert!(controller.error_surface().visible.is_none());
}

#[tokio::test]
async fn failed_start_shows_fetch_error_without_rendering() {
    let api = Arc::new(InMemoryTaskApi::with_tasks(sample_tasks()));
    api.fail_next(TaskError::transport(Some(500), "GET tasks"))
        .await;
    let store = Arc::new(TaskStore::new(api.clone()));
    let mut controller = InteractionController::new(
        store,
        RecordingRenderer::default(),
        RecordingErrors::default(),
        ScriptedPrompt::default(),
    );

    controller.start();
    assert_eq!(controller.renderer().loading, vec![true]);
    controller.process_next_outcome().await;

    assert_eq!(controller.renderer().loading, vec![true, false]);
    assert!(controller.renderer().renders.is_empty());
    assert_eq!(
        controller.error_surface().visible.as_deref(),
        Some("Failed to fetch tasks")
    );
    assert!(controller.store().is_empty().await);
}

#[tokio::test]
async fn missing_backend_reports_fetch_failure() {
    let store = Arc::new(TaskStore::new(MissingTaskApi));
    let mut controller = InteractionController::new(
        store,
        RecordingRenderer::default(),
        RecordingErrors::default(),
        ScriptedPrompt::default(),
    );

    controller.start();
    controller.process_next_outcome().await;

    assert_eq!(
        controller.error_surface().visible.as_deref(),
        Some("Failed to fetch tasks")
    );
    assert!(controller.renderer().renders.is_empty());
}

#[tokio::test]
async fn blank_form_reports_validation_error_and_skips_store() {
    let (mut controller, api) = started(sample_tasks(), ScriptedPrompt::default()).await;

    fill_form(&mut controller, "   ", "milk").await;
    controller.handle(UiEvent::FormSubmitted).await;

    assert_eq!(
        controller.error_surface().visible.as_deref(),
        Some("Title and description are required.")
    );
    assert_eq!(api.calls().await, vec!["list"]);
    assert_eq!(controller.store().len().await, 3);
    assert_eq!(controller.form().title, "   ");
}

#[tokio::test]
async fn valid_submit_clears_error_adds_task_and_resets_form() {
    let (mut controller, _) = started(sample_tasks(), ScriptedPrompt::default()).await;

    fill_form(&mut controller, "", "").await;
    controller.handle(UiEvent::FormSubmitted).await;
    assert!(controller.error_surface().visible.is_some());

    fill_form(&mut controller, "Buy milk", "2%").await;
    controller.handle(UiEvent::FormSubmitted).await;
    assert!(controller.error_surface().visible.is_none());
    assert_eq!(controller.form(), &TaskForm::default());
    controller.process_next_outcome().await;

    assert_eq!(controller.renderer().last_ids(), vec![1, 2, 3, 201]);
    let added = controller.store().get(TaskId(201)).await.expect("added");
    assert_eq!(added.title, "Buy milk");
    assert_eq!(added.description, "2%");
    assert!(!added.completed);
}

#[tokio::test]
async fn failed_add_reports_error_and_still_resets_form() {
    let (mut controller, api) = started(sample_tasks(), ScriptedPrompt::default()).await;
    api.fail_next(TaskError::transport(Some(500), "POST task"))
        .await;

    fill_form(&mut controller, "Buy milk", "2%").await;
    handle_and_settle(&mut controller, UiEvent::FormSubmitted).await;

    assert_eq!(
        controller.error_surface().visible.as_deref(),
        Some("Failed to add task")
    );
    assert_eq!(controller.form(), &TaskForm::default());
    assert_eq!(controller.store().len().await, 3);
}

#[tokio::test]
async fn search_and_sort_each_project_the_full_collection() {
    let (mut controller, _) = started(sample_tasks(), ScriptedPrompt::default()).await;

    controller
        .handle(UiEvent::SearchChanged("ti".into()))
        .await;
    assert_eq!(controller.renderer().last_ids(), vec![1, 3]);

    controller
        .handle(UiEvent::SortChanged(SortCriterion::NotCompleted))
        .await;
    assert_eq!(controller.renderer().last_ids(), vec![2]);
    assert!(controller.view_state().search_query.is_empty());

    controller
        .handle(UiEvent::SearchChanged("OTHER".into()))
        .await;
    assert_eq!(controller.view_state().sort, SortCriterion::None);
    assert_eq!(controller.renderer().last_ids(), vec![2]);
}

#[tokio::test]
async fn change_after_search_renders_full_collection() {
    let (mut controller, _) = started(sample_tasks(), ScriptedPrompt::default()).await;

    controller
        .handle(UiEvent::SearchChanged("title a".into()))
        .await;
    assert_eq!(controller.renderer().last_ids(), vec![1]);

    handle_and_settle(
        &mut controller,
        UiEvent::CompletionToggled {
            id: TaskId(2),
            completed: true,
        },
    )
    .await;

    assert_eq!(controller.renderer().last_ids(), vec![1, 2, 3]);
    assert_eq!(controller.view_state(), &ViewState::default());
}

#[tokio::test]
async fn local_edit_after_sort_renders_full_collection() {
    let prompt = ScriptedPrompt::answering([Some("Renamed"), Some("Notes")]);
    let (mut controller, _) = started(sample_tasks(), prompt).await;

    controller
        .handle(UiEvent::SortChanged(SortCriterion::Completed))
        .await;
    assert_eq!(controller.renderer().last_ids(), vec![1, 3]);

    controller.handle(UiEvent::EditRequested(TaskId(3))).await;
    assert_eq!(controller.renderer().last_ids(), vec![1, 2, 3]);
}

#[tokio::test]
async fn pending_remote_call_does_not_block_other_events() {
    let api = Arc::new(InMemoryTaskApi::with_tasks(sample_tasks()).with_gated_completion());
    let mut controller = started_with(api.clone(), ScriptedPrompt::default()).await;

    timeout(
        Duration::from_secs(1),
        controller.handle(UiEvent::CompletionToggled {
            id: TaskId(2),
            completed: true,
        }),
    )
    .await
    .expect("toggle handler must not wait for the response");

    timeout(
        Duration::from_secs(1),
        controller.handle(UiEvent::SearchChanged("other".into())),
    )
    .await
    .expect("search handled while toggle is pending");
    assert_eq!(controller.renderer().last_ids(), vec![2]);
    let pending = controller.store().get(TaskId(2)).await.expect("task");
    assert!(!pending.completed);

    api.release_completion();
    controller.process_next_outcome().await;

    let done = controller.store().get(TaskId(2)).await.expect("task");
    assert!(done.completed);
    assert_eq!(controller.renderer().last_ids(), vec![1, 2, 3]);
}

#[tokio::test]
async fn toggle_of_unknown_task_reports_not_found() {
    let (mut controller, api) = started(sample_tasks(), ScriptedPrompt::default()).await;
    let renders = controller.renderer().renders.len();

    handle_and_settle(
        &mut controller,
        UiEvent::CompletionToggled {
            id: TaskId(40),
            completed: true,
        },
    )
    .await;

    assert_eq!(
        controller.error_surface().visible.as_deref(),
        Some("Task not found")
    );
    assert_eq!(controller.renderer().renders.len(), renders);
    assert_eq!(api.calls().await, vec!["list"]);
}

#[tokio::test]
async fn successful_operation_clears_previous_error() {
    let (mut controller, _) = started(sample_tasks(), ScriptedPrompt::default()).await;

    handle_and_settle(&mut controller, UiEvent::DeleteRequested(TaskId(40))).await;
    assert!(controller.error_surface().visible.is_some());

    handle_and_settle(
        &mut controller,
        UiEvent::CompletionToggled {
            id: TaskId(1),
            completed: false,
        },
    )
    .await;
    assert!(controller.error_surface().visible.is_none());
}

#[tokio::test]
async fn edit_prompts_with_current_values_and_stays_local() {
    let prompt = ScriptedPrompt::answering([Some("Renamed"), Some("New details")]);
    let (mut controller, api) = started(sample_tasks(), prompt).await;

    controller.handle(UiEvent::EditRequested(TaskId(2))).await;

    let edited = controller.store().get(TaskId(2)).await.expect("task");
    assert_eq!(edited.title, "Renamed");
    assert_eq!(edited.description, "New details");
    assert_eq!(
        controller.prompt.asked,
        vec![
            ("Enter new title".to_string(), "Other".to_string()),
            ("Enter new description".to_string(), "details 2".to_string()),
        ]
    );
    assert_eq!(api.calls().await, vec!["list"]);
}

#[tokio::test]
async fn cancelled_edit_leaves_task_unchanged() {
    let prompt = ScriptedPrompt::answering([Some("Renamed"), None]);
    let (mut controller, _) = started(sample_tasks(), prompt).await;
    let renders = controller.renderer().renders.len();

    controller.handle(UiEvent::EditRequested(TaskId(2))).await;

    let task = controller.store().get(TaskId(2)).await.expect("task");
    assert_eq!(task.title, "Other");
    assert_eq!(controller.renderer().renders.len(), renders);
    assert!(controller.error_surface().visible.is_none());
}

#[tokio::test]
async fn failed_delete_keeps_task_and_reports() {
    let (mut controller, api) = started(sample_tasks(), ScriptedPrompt::default()).await;
    api.fail_next(TaskError::transport(Some(500), "DELETE task"))
        .await;

    handle_and_settle(&mut controller, UiEvent::DeleteRequested(TaskId(1))).await;

    assert_eq!(
        controller.error_surface().visible.as_deref(),
        Some("Failed to delete task")
    );
    assert_eq!(controller.store().len().await, 3);
}

#[tokio::test]
async fn add_toggle_delete_through_events() {
    let (mut controller, _) = started(Vec::new(), ScriptedPrompt::default()).await;

    fill_form(&mut controller, "Buy milk", "2%").await;
    handle_and_settle(&mut controller, UiEvent::FormSubmitted).await;
    let id = TaskId(201);

    handle_and_settle(
        &mut controller,
        UiEvent::CompletionToggled {
            id,
            completed: true,
        },
    )
    .await;
    let rendered = controller.renderer().renders.last().expect("render");
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].completed);
    assert_eq!(rendered[0].title, "Buy milk");
    assert_eq!(rendered[0].description, "2%");

    handle_and_settle(&mut controller, UiEvent::DeleteRequested(id)).await;
    assert!(controller.store().is_empty().await);
    assert!(controller.renderer().last_ids().is_empty());
}
