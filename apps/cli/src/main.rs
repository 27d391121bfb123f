use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::TaskStore;
use tasks_cli::{
    config::load_settings,
    controller::InteractionController,
    ui::terminal::{run_session, TerminalErrorSurface, TerminalInput, TerminalRenderer},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Task list kept in sync with a remote task API")]
struct Args {
    /// Task collection endpoint, e.g. https://jsonplaceholder.typicode.com/todos
    #[arg(long)]
    api_url: Option<String>,
    /// Settings file; defaults to ./tasks.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    info!(api_url = %settings.api_url, "starting task client");

    let store = Arc::new(
        TaskStore::from_config(&settings.client_config())
            .context("invalid task api configuration")?,
    );
    let input = TerminalInput::stdin();
    let mut controller = InteractionController::new(
        store,
        TerminalRenderer::stdout(),
        TerminalErrorSurface::default(),
        input.clone(),
    );

    controller.start();
    run_session(&mut controller, input).await
}
