//! Event handlers translating user actions into task store calls.
//!
//! Remote-backed store calls run as spawned tasks and report back through
//! [`StoreOutcome`]s, so a slow request only delays its own result while other
//! events keep being handled.

use std::{future::Future, sync::Arc};

use client_core::{SortCriterion, TaskApi, TaskStore, ViewState};
use shared::{
    domain::{Task, TaskId},
    error::{TaskError, TaskResult},
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    controller::events::{StoreOutcome, UiError, UiErrorContext, UiEvent},
    ui::{ErrorSurface, TaskForm, TaskRenderer, TextPrompt},
};

pub struct InteractionController<A, R, E, P> {
    store: Arc<TaskStore<A>>,
    renderer: R,
    errors: E,
    prompt: P,
    form: TaskForm,
    view: ViewState,
    outcomes_tx: mpsc::UnboundedSender<StoreOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<StoreOutcome>,
}

impl<A, R, E, P> InteractionController<A, R, E, P>
where
    A: TaskApi + 'static,
    R: TaskRenderer,
    E: ErrorSurface,
    P: TextPrompt,
{
    pub fn new(store: Arc<TaskStore<A>>, renderer: R, errors: E, prompt: P) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            store,
            renderer,
            errors,
            prompt,
            form: TaskForm::default(),
            view: ViewState::default(),
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn store(&self) -> &Arc<TaskStore<A>> {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn error_surface(&self) -> &E {
        &self.errors
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Starts the initial fetch with the loading indicator shown until its
    /// outcome is applied.
    pub fn start(&mut self) {
        self.renderer.set_loading(true);
        let store = self.store.clone();
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = store.initialize().await;
            let _ = tx.send(StoreOutcome::Loaded(result));
        });
    }

    pub async fn handle(&mut self, event: UiEvent) {
        debug!(?event, "handling ui event");
        match event {
            UiEvent::FormTitleChanged(title) => self.form.title = title,
            UiEvent::FormDescriptionChanged(description) => self.form.description = description,
            UiEvent::FormSubmitted => self.submit_form(),
            UiEvent::SearchChanged(query) => self.search_changed(query).await,
            UiEvent::SortChanged(sort) => self.sort_changed(sort).await,
            UiEvent::CompletionToggled { id, completed } => self.toggle_completion(id, completed),
            UiEvent::EditRequested(id) => self.edit_task(id).await,
            UiEvent::DeleteRequested(id) => self.delete_task(id),
        }
    }

    /// Validates, then submits the form as typed. The form is reset as soon
    /// as validation passes, whatever the remote create reports later.
    pub fn submit_form(&mut self) {
        if !self.form.is_complete() {
            self.report(UiError::validation());
            return;
        }
        self.errors.clear();

        let TaskForm { title, description } = self.form.clone();
        self.form.reset();
        let store = self.store.clone();
        self.spawn_change(UiErrorContext::AddTask, async move {
            store.add_task(&title, &description).await
        });
    }

    pub async fn search_changed(&mut self, query: impl Into<String>) {
        self.view = ViewState::search(query);
        self.render().await;
    }

    pub async fn sort_changed(&mut self, sort: SortCriterion) {
        self.view = ViewState::sorted(sort);
        self.render().await;
    }

    pub fn toggle_completion(&mut self, id: TaskId, completed: bool) {
        let store = self.store.clone();
        self.spawn_change(UiErrorContext::UpdateStatus, async move {
            store.set_completion(id, completed).await
        });
    }

    /// Prompts for a new title and description, pre-filled with the current
    /// values. Cancelling either prompt abandons the edit. The edit is local,
    /// so it is applied inline.
    pub async fn edit_task(&mut self, id: TaskId) {
        let Some(task) = self.store.get(id).await else {
            self.report(UiError::from_task_error(
                UiErrorContext::EditTask,
                &TaskError::NotFound(id),
            ));
            return;
        };

        let Some(title) = self.prompt.prompt("Enter new title", &task.title).await else {
            debug!(task_id = id.0, "edit cancelled");
            return;
        };
        let Some(description) = self
            .prompt
            .prompt("Enter new description", &task.description)
            .await
        else {
            debug!(task_id = id.0, "edit cancelled");
            return;
        };

        let result = self.store.edit_task_locally(id, &title, &description).await;
        self.apply(StoreOutcome::Changed {
            context: UiErrorContext::EditTask,
            result,
        })
        .await;
    }

    pub fn delete_task(&mut self, id: TaskId) {
        let store = self.store.clone();
        self.spawn_change(UiErrorContext::DeleteTask, async move {
            store.remove_task(id).await
        });
    }

    /// Re-renders the current view without changing it.
    pub async fn refresh(&mut self) {
        self.render().await;
    }

    /// Waits for the next finished store call. Cancel safe.
    pub async fn next_outcome(&mut self) -> Option<StoreOutcome> {
        self.outcomes_rx.recv().await
    }

    /// Waits for the next finished store call and applies it.
    pub async fn process_next_outcome(&mut self) {
        if let Some(outcome) = self.next_outcome().await {
            self.apply(outcome).await;
        }
    }

    /// A successful change shows the full collection again; a failure only
    /// updates the error surface.
    pub async fn apply(&mut self, outcome: StoreOutcome) {
        match outcome {
            StoreOutcome::Loaded(result) => {
                self.renderer.set_loading(false);
                match result {
                    Ok(_) => self.render().await,
                    Err(err) => {
                        self.report(UiError::from_task_error(UiErrorContext::InitialLoad, &err))
                    }
                }
            }
            StoreOutcome::Changed {
                context,
                result: Ok(task),
            } => {
                debug!(task_id = task.id.0, ?context, "store change applied");
                self.errors.clear();
                self.view = ViewState::default();
                self.render().await;
            }
            StoreOutcome::Changed {
                context,
                result: Err(err),
            } => self.report(UiError::from_task_error(context, &err)),
        }
    }

    fn spawn_change<F>(&self, context: UiErrorContext, change: F)
    where
        F: Future<Output = TaskResult<Task>> + Send + 'static,
    {
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = change.await;
            let _ = tx.send(StoreOutcome::Changed { context, result });
        });
    }

    async fn render(&mut self) {
        let tasks = self.store.snapshot().await;
        let visible = self.view.project(&tasks);
        self.renderer.render(&visible);
    }

    fn report(&mut self, err: UiError) {
        warn!(context = ?err.context(), code = ?err.code(), "{}", err.message());
        self.errors.show(err.message());
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
