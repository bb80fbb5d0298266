//! Logging types.

use serde::{Deserialize, Serialize};

/// Severity of a log line, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// What goes into a batch log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Lines below this level are only sent to `tracing`.
    pub level: LogLevel,
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_timestamps: true,
        }
    }
}

/// Receives each formatted batch log line, e.g. a log pane in the panel.
pub type GuiLogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Markers that make batch logs easy to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Start of a sequence: `--- Shot010 ---`
    Sequence,
    Done,
    Warning,
    Error,
}

impl MessagePrefix {
    pub fn format(&self, message: &str) -> String {
        match self {
            Self::Sequence => format!("--- {} ---", message),
            Self::Done => format!("[DONE] {}", message),
            Self::Warning => format!("[WARN] {}", message),
            Self::Error => format!("[FAIL] {}", message),
        }
    }
}
