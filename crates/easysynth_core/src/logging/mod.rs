//! Logging for EasySynth.
//!
//! Application-wide output goes through `tracing`; `init_tracing` installs the
//! subscriber. Each batch render additionally gets a `BatchLogger` that keeps
//! a log file and feeds the panel's log view.
//!
//! # Example
//!
//! ```no_run
//! use easysynth_core::logging::{init_tracing, BatchLogger, LogConfig, LogLevel};
//!
//! init_tracing(LogLevel::Info);
//!
//! let logger = BatchLogger::new(".easysynth/logs", LogConfig::default(), None).unwrap();
//! logger.sequence("Shot010");
//! logger.done("Batch finished");
//! ```

mod batch_logger;
mod types;

pub use batch_logger::BatchLogger;
pub use types::{GuiLogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this again is a
/// no-op.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

/// Quiet subscriber for unit tests.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
