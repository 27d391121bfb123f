//! Line-oriented terminal front end.

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use client_core::{SortCriterion, TaskApi};
use shared::domain::{Task, TaskId};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
};
use tracing::{debug, warn};

use crate::{
    controller::{events::UiEvent, InteractionController},
    ui::{ErrorSurface, TaskRenderer, TextPrompt},
};

pub const HELP: &str = "\
commands:
  add                    create a task (prompts for title and description)
  search <text>          show tasks whose title contains <text>
  sort <criterion>       none | completed | not-completed
  toggle <id>            flip the completion flag
  edit <id>              change title and description (local only)
  delete <id>            delete a task
  list                   re-render the current view
  help                   show this message
  quit                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add,
    Search(String),
    Sort(SortCriterion),
    Toggle(TaskId),
    Edit(TaskId),
    Delete(TaskId),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "add" => Ok(Command::Add),
        // An empty query resets the view to the whole collection.
        "search" => Ok(Command::Search(rest.to_string())),
        "sort" => rest.parse().map(Command::Sort),
        "toggle" => parse_task_id(rest).map(Command::Toggle),
        "edit" => parse_task_id(rest).map(Command::Edit),
        "delete" => parse_task_id(rest).map(Command::Delete),
        "list" | "ls" => Ok(Command::List),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}'; type 'help'")),
    }
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    raw.parse::<i64>()
        .map(TaskId)
        .map_err(|_| format!("expected a numeric task id, got '{raw}'"))
}

pub struct TerminalRenderer<W> {
    out: W,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_cards(&mut self, tasks: &[Task]) -> io::Result<()> {
        if tasks.is_empty() {
            writeln!(self.out, "(no tasks)")?;
        }
        for task in tasks {
            let mark = if task.completed { 'x' } else { ' ' };
            writeln!(self.out, "#{} [{mark}] {}", task.id, task.title)?;
            if !task.description.is_empty() {
                writeln!(self.out, "    {}", task.description)?;
            }
            writeln!(self.out, "    {}", task.status_label())?;
        }
        self.out.flush()
    }
}

impl<W: Write> TaskRenderer for TerminalRenderer<W> {
    fn render(&mut self, tasks: &[Task]) {
        if let Err(err) = self.write_cards(tasks) {
            warn!("failed to render tasks: {err}");
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            if let Err(err) = writeln!(self.out, "Loading tasks...") {
                warn!("failed to render loading indicator: {err}");
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct TerminalErrorSurface {
    visible: Option<String>,
}

impl TerminalErrorSurface {
    pub fn visible(&self) -> Option<&str> {
        self.visible.as_deref()
    }
}

impl ErrorSurface for TerminalErrorSurface {
    fn show(&mut self, message: &str) {
        eprintln!("error: {message}");
        self.visible = Some(message.to_string());
    }

    fn clear(&mut self) {
        self.visible = None;
    }
}

type StdinLines = Lines<BufReader<Stdin>>;

/// Async line reader over stdin shared by the command loop and the prompts.
#[derive(Clone)]
pub struct TerminalInput {
    lines: Arc<Mutex<StdinLines>>,
}

impl TerminalInput {
    pub fn stdin() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    /// Next input line, or `None` at end of input. Cancel safe.
    pub async fn next_line(&self) -> io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Answers prompts from stdin. An empty answer keeps the default; end of
/// input cancels.
#[async_trait]
impl TextPrompt for TerminalInput {
    async fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        if default.is_empty() {
            print!("{message}: ");
        } else {
            print!("{message} [{default}]: ");
        }
        io::stdout().flush().ok()?;

        match self.next_line().await {
            Ok(Some(answer)) if answer.trim_end_matches('\r').is_empty() => {
                Some(default.to_string())
            }
            Ok(Some(answer)) => Some(answer.trim_end_matches('\r').to_string()),
            Ok(None) | Err(_) => None,
        }
    }
}

/// Reads commands while store calls are in flight; finished calls are
/// applied as soon as they arrive.
pub async fn run_session<A, R, E, P>(
    controller: &mut InteractionController<A, R, E, P>,
    mut input: TerminalInput,
) -> Result<()>
where
    A: TaskApi + 'static,
    R: TaskRenderer,
    E: ErrorSurface,
    P: TextPrompt,
{
    println!("{HELP}");
    print_cursor()?;

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line.context("failed to read command")? else {
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => return Ok(()),
                    Ok(command) => dispatch(controller, &mut input, command).await,
                    Err(message) if line.trim().is_empty() => debug!("{message}"),
                    Err(message) => eprintln!("{message}"),
                }
                print_cursor()?;
            }
            Some(outcome) = controller.next_outcome() => {
                controller.apply(outcome).await;
            }
        }
    }
}

fn print_cursor() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")
}

async fn dispatch<A, R, E, P>(
    controller: &mut InteractionController<A, R, E, P>,
    input: &mut TerminalInput,
    command: Command,
) where
    A: TaskApi + 'static,
    R: TaskRenderer,
    E: ErrorSurface,
    P: TextPrompt,
{
    match command {
        Command::Add => {
            let Some(title) = input.prompt("Title", "").await else {
                return;
            };
            let Some(description) = input.prompt("Description", "").await else {
                return;
            };
            controller.handle(UiEvent::FormTitleChanged(title)).await;
            controller
                .handle(UiEvent::FormDescriptionChanged(description))
                .await;
            controller.handle(UiEvent::FormSubmitted).await;
        }
        Command::Search(query) => controller.handle(UiEvent::SearchChanged(query)).await,
        Command::Sort(sort) => controller.handle(UiEvent::SortChanged(sort)).await,
        Command::Toggle(id) => {
            // The checkbox carries the new value, so flip what is stored.
            let completed = match controller.store().get(id).await {
                Some(task) => !task.completed,
                None => true,
            };
            controller
                .handle(UiEvent::CompletionToggled { id, completed })
                .await;
        }
        Command::Edit(id) => controller.handle(UiEvent::EditRequested(id)).await,
        Command::Delete(id) => controller.handle(UiEvent::DeleteRequested(id)).await,
        Command::List => controller.refresh().await,
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}
