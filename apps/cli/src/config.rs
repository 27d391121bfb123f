use std::{fs, path::Path};

use anyhow::Context;
use client_core::ClientConfig;
use serde::Deserialize;
use shared::domain::UserId;

pub const DEFAULT_CONFIG_FILE: &str = "tasks.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub user_id: UserId,
    pub initial_fetch_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            api_url: client.api_url,
            user_id: client.user_id,
            initial_fetch_limit: client.initial_fetch_limit,
        }
    }
}

impl Settings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            user_id: self.user_id,
            initial_fetch_limit: self.initial_fetch_limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    user_id: Option<i64>,
    initial_fetch_limit: Option<usize>,
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicitly named file must exist; the default `tasks.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.user_id {
        settings.user_id = UserId(v);
    }
    if let Some(v) = file_cfg.initial_fetch_limit {
        settings.initial_fetch_limit = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("TASKS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    // Unparsable numbers keep the previous value.
    if let Some(v) = lookup("APP__USER_ID").and_then(|v| v.parse::<i64>().ok()) {
        settings.user_id = UserId(v);
    }
    if let Some(v) = lookup("APP__INITIAL_FETCH_LIMIT").and_then(|v| v.parse::<usize>().ok()) {
        settings.initial_fetch_limit = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
