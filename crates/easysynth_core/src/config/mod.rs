//! Application settings.
//!
//! `settings.toml` holds four tables (`paths`, `logging`, `batch`,
//! `renderer`). Missing tables and keys take their defaults and are written
//! back on load. Writes go through a temp file and a rename, and single
//! tables can be rewritten without touching the others.
//!
//! # Example
//!
//! ```no_run
//! use easysynth_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".easysynth/settings.toml");
//! config.load_or_create().unwrap();
//!
//! config.settings_mut().batch.settle_delay_ms = 500;
//! config.update_section(ConfigSection::Batch).unwrap();
//! ```

mod manager;
mod settings;

pub(crate) use manager::atomic_write;
pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    BatchSettings, ConfigSection, LoggingSettings, PathSettings, RendererSettings, Settings,
};
