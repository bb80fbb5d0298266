//! Core types for the batch orchestrator.

use std::path::PathBuf;

use thiserror::Error;

use crate::jobs::ResolveError;
use crate::models::{OutputImageResolution, TargetConfiguration};

/// Everything a batch needs from the control panel at start.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Folder to scan for level sequences.
    pub sequences_folder: PathBuf,
    /// Base directory; each sequence renders into a subfolder named after it.
    pub output_directory: PathBuf,
    pub config: TargetConfiguration,
    pub resolution: OutputImageResolution,
}

/// Where the orchestrator is in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Idle,
    Discovering,
    /// Job at this index is in flight.
    Rendering(usize),
    /// Between the job at this index and the next one.
    CleaningUp(usize),
}

/// Why a batch stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    InvalidFolder(ResolveError),
    NoSequencesFound,
    StartFailed { sequence: String, message: String },
    RenderFailed { sequence: String, error: String },
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFolder(e) => write!(f, "invalid folder: {}", e),
            Self::NoSequencesFound => write!(f, "no sequences found"),
            Self::StartFailed { sequence, message } => {
                write!(f, "could not start '{}': {}", sequence, message)
            }
            Self::RenderFailed { sequence, error } => {
                write!(f, "rendering '{}' failed: {}", sequence, error)
            }
        }
    }
}

/// How the last batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed { count: usize },
    Aborted(AbortReason),
}

/// Result of a start request or a completion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The first job of a new batch is rendering.
    Started { total: usize },
    /// The previous job succeeded and the job at `index` is rendering.
    Advanced { index: usize, total: usize },
    /// The last job succeeded.
    Completed { count: usize },
    /// The batch stopped; state was reset.
    Aborted(AbortReason),
    /// A completion arrived with no batch active.
    SingleRenderFinished { success: bool },
}

/// Start request refused by the render gate; nothing changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartRejected {
    #[error("No sequences folder selected")]
    NoFolderSelected,

    #[error("No render targets selected")]
    NoTargetsSelected,

    #[error("The renderer is busy")]
    RendererBusy,

    #[error("A batch is already running")]
    BatchActive,
}
