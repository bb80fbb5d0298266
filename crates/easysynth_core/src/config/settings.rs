//! Typed contents of `settings.toml`, one struct per table.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Between-sequence cleanup for batch renders.
    #[serde(default)]
    pub batch: BatchSettings,

    /// External renderer invocation.
    #[serde(default)]
    pub renderer: RendererSettings,
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder holding the persisted panel state record.
    #[serde(default = "default_state_folder")]
    pub state_folder: String,

    /// Folder for batch log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Output directory used until the user picks one.
    #[serde(default = "default_output_directory")]
    pub default_output_directory: String,

    /// Project content directory, mapped to the `/Game` namespace.
    #[serde(default = "default_content_root")]
    pub content_root: String,
}

fn default_state_folder() -> String {
    ".easysynth".to_string()
}

fn default_logs_folder() -> String {
    ".easysynth/logs".to_string()
}

fn default_output_directory() -> String {
    "Saved/EasySynth".to_string()
}

fn default_content_root() -> String {
    "Content".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            state_folder: default_state_folder(),
            logs_folder: default_logs_folder(),
            default_output_directory: default_output_directory(),
            content_root: default_content_root(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when RUST_LOG is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Write a log file per batch render.
    #[serde(default = "default_true")]
    pub batch_log_files: bool,

    /// Prefix batch log lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl LoggingSettings {
    /// Options for per-batch log files.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            show_timestamps: self.show_timestamps,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            batch_log_files: true,
            show_timestamps: true,
        }
    }
}

/// Cleanup performed between two sequences of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Ask the renderer to reclaim memory before the next sequence.
    #[serde(default = "default_true")]
    pub reclaim_memory: bool,

    /// Settling delay after reclamation, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    1000
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            reclaim_memory: true,
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl BatchSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// External renderer command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererSettings {
    /// Program to launch for each sequence.
    #[serde(default = "default_renderer_program")]
    pub program: String,

    /// Extra arguments placed before the per-job arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_renderer_program() -> String {
    "easysynth-render".to_string()
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            program: default_renderer_program(),
            extra_args: Vec::new(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Batch,
    Renderer,
}

impl ConfigSection {
    /// All sections, in file order.
    pub fn all() -> &'static [ConfigSection] {
        &[Self::Paths, Self::Logging, Self::Batch, Self::Renderer]
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.table_name() == name)
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Batch => "batch",
            ConfigSection::Renderer => "renderer",
        }
    }

    /// Comment written above the section header.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# State, log, output and content directories",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Batch => "# Cleanup between sequences of a batch render",
            ConfigSection::Renderer => "# External renderer command",
        }
    }
}
