//! EasySynth Core - control panel logic for synthetic image rendering
//!
//! This crate contains the panel state, persistence and the batch
//! sequence-rendering state machine, with zero UI dependencies. The renderer,
//! asset registry and dialogs are reached through traits so that an editor
//! plugin or a CLI tool can host it.

pub mod config;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod panel;
pub mod persistence;
pub mod render;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
