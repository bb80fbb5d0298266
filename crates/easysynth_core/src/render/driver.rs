//! Render job driver seam.

use std::path::Path;

use thiserror::Error;

use crate::jobs::SequenceRenderJob;
use crate::models::{OutputImageResolution, TargetConfiguration};

/// Synchronous refusal to start a render job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("The renderer is already rendering")]
    Busy,

    #[error("Invalid sequence '{0}'")]
    InvalidSequence(String),

    #[error("No render targets selected")]
    NothingToRender,

    #[error("Could not prepare output directory {path}: {message}")]
    OutputDirectory { path: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl StartError {
    pub fn output_directory(path: &Path, message: impl Into<String>) -> Self {
        Self::OutputDirectory {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Out-of-band completion notification emitted by a driver.
///
/// Exactly one is emitted per successfully started job. Hosts deliver it to
/// [`crate::orchestrator::BatchOrchestrator::on_rendering_finished`] on the
/// orchestrator's own thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderingFinished {
    pub success: bool,
}

/// Adapter around the external sequence renderer.
pub trait RenderDriver {
    /// Ask the renderer to start rendering one sequence.
    ///
    /// Returns once the job has been accepted; completion is reported
    /// later through [`RenderingFinished`].
    fn start_render(
        &mut self,
        job: &SequenceRenderJob,
        config: &TargetConfiguration,
        resolution: OutputImageResolution,
    ) -> Result<(), StartError>;

    /// Whether a job is currently in flight.
    fn is_rendering(&self) -> bool;

    /// Text describing the most recent failure.
    fn error_message(&self) -> String;

    /// Force the engine to reclaim transient memory between sequences.
    fn reclaim_memory(&mut self) {}
}
