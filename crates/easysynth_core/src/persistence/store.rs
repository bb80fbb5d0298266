//! Record storage backends.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::record::PanelStateRecord;
use crate::config::atomic_write;
use crate::models::RenderTargetKind;

/// Errors that can occur while loading or saving panel state.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to access record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse record {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid format code {code} stored for {target}")]
    InvalidFormatCode { target: RenderTargetKind, code: i8 },

    #[error("Invalid record name '{0}'")]
    InvalidName(String),
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Where panel state records live.
///
/// `name` identifies a record the way an asset path identifies an asset.
pub trait RecordStore {
    /// Load an existing record, or `None` if there is none under `name`.
    fn load_record(&self, name: &str) -> PersistenceResult<Option<PanelStateRecord>>;

    /// Make a fresh record for `name`. It is not stored until saved.
    fn create_record(&self, name: &str) -> PanelStateRecord {
        tracing::debug!("Creating panel state record '{}'", name);
        PanelStateRecord::default()
    }

    /// Persist `record` under `name`, replacing any previous content.
    fn save_record(&self, name: &str, record: &PanelStateRecord) -> PersistenceResult<()>;
}

/// Stores each record as `<root>/<name>.toml`.
#[derive(Debug, Clone)]
pub struct TomlRecordStore {
    root: PathBuf,
}

impl TomlRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `name`.
    pub fn record_path(&self, name: &str) -> PersistenceResult<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistenceError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}.toml", name)))
    }
}

impl RecordStore for TomlRecordStore {
    fn load_record(&self, name: &str) -> PersistenceResult<Option<PanelStateRecord>> {
        let path = self.record_path(name)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let record = toml::from_str(&content).map_err(|source| PersistenceError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!("Loaded panel state from {}", path.display());
        Ok(Some(record))
    }

    fn save_record(&self, name: &str, record: &PanelStateRecord) -> PersistenceResult<()> {
        let path = self.record_path(name)?;
        let content = toml::to_string_pretty(record)?;
        atomic_write(&path, &content)?;

        tracing::debug!("Saved panel state to {}", path.display());
        Ok(())
    }
}
