//! Terminal task list: interaction controller, terminal capabilities, and settings.

pub mod config;
pub mod controller;
pub mod ui;
