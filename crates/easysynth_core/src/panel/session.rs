//! The control panel session: panel state plus the collaborators acting on it.

use std::path::{Path, PathBuf};

use crate::models::{
    ImageFormat, OutputImageResolution, ParseError, RenderTargetKind, TargetConfiguration,
};
use crate::orchestrator::{BatchOrchestrator, BatchRequest, StartRejected, Transition};
use crate::persistence::{PanelState, PersistenceBridge, PersistenceResult};

/// Top-level panel object.
///
/// Holds the values the user edits and owns the persistence bridge and
/// batch orchestrator. Everything runs on the thread that owns the panel.
pub struct ControlPanel {
    targets: TargetConfiguration,
    resolution: OutputImageResolution,
    output_directory: PathBuf,
    sequences_folder: PathBuf,
    bridge: PersistenceBridge,
    orchestrator: BatchOrchestrator,
}

impl ControlPanel {
    pub fn new(bridge: PersistenceBridge, orchestrator: BatchOrchestrator) -> Self {
        Self {
            targets: TargetConfiguration::default(),
            resolution: OutputImageResolution::default(),
            output_directory: PathBuf::new(),
            sequences_folder: PathBuf::new(),
            bridge,
            orchestrator,
        }
    }

    pub fn targets(&self) -> &TargetConfiguration {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetConfiguration {
        &mut self.targets
    }

    pub fn resolution(&self) -> OutputImageResolution {
        self.resolution
    }

    pub fn set_output_width(&mut self, width: u32) {
        self.resolution.set_width(width);
    }

    pub fn set_output_height(&mut self, height: u32) {
        self.resolution.set_height(height);
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn set_output_directory(&mut self, dir: impl Into<PathBuf>) {
        self.output_directory = dir.into();
    }

    pub fn sequences_folder(&self) -> &Path {
        &self.sequences_folder
    }

    pub fn set_sequences_folder(&mut self, folder: impl Into<PathBuf>) {
        self.sequences_folder = folder.into();
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// Select or deselect a target by its key (`color`, `depth`, ...).
    pub fn set_target_selected(&mut self, key: &str, selected: bool) -> Result<(), ParseError> {
        let kind = RenderTargetKind::from_key(key).map_err(log_parse_error)?;
        self.targets.set_selected(kind, selected);
        Ok(())
    }

    /// Pick the output format of a target by key and format name.
    pub fn set_target_format(&mut self, key: &str, format: &str) -> Result<(), ParseError> {
        let kind = RenderTargetKind::from_key(key).map_err(log_parse_error)?;
        let format = ImageFormat::from_name(format).map_err(log_parse_error)?;
        self.targets.set_format(kind, format);
        Ok(())
    }

    /// Pick the output format of a target by its combo-box index.
    pub fn set_target_format_code(
        &mut self,
        kind: RenderTargetKind,
        code: i8,
    ) -> Result<(), ParseError> {
        let format = ImageFormat::from_code(code).map_err(log_parse_error)?;
        self.targets.set_format(kind, format);
        Ok(())
    }

    /// Whether the render button should be enabled.
    pub fn is_render_enabled(&self) -> bool {
        self.orchestrator.can_start(&self.batch_request()).is_ok()
    }

    /// Start a batch over the selected folder, then save the panel state.
    ///
    /// The state is saved whatever the batch start turns into, as long as the
    /// request passed the render gate. Save failures are logged only.
    pub fn on_render_clicked(&mut self) -> Result<Transition, StartRejected> {
        let transition = self.orchestrator.start_batch(self.batch_request())?;

        if let Err(e) = self.save_options() {
            tracing::error!("Failed to save panel state: {}", e);
        }
        Ok(transition)
    }

    /// Forward a renderer completion to the orchestrator.
    pub fn on_rendering_finished(&mut self, success: bool) -> Transition {
        self.orchestrator.on_rendering_finished(success)
    }

    /// Snapshot of the persistable state.
    pub fn state(&self) -> PanelState {
        PanelState {
            targets: self.targets.clone(),
            resolution: self.resolution,
            output_directory: self.output_directory.clone(),
        }
    }

    pub fn apply_state(&mut self, state: PanelState) {
        self.targets = state.targets;
        self.resolution = state.resolution;
        self.output_directory = state.output_directory;
    }

    /// Restore the saved state. Returns whether a saved state existed.
    ///
    /// The sequences folder is always cleared, saved state or not.
    pub fn load_options(&mut self) -> PersistenceResult<bool> {
        self.sequences_folder = PathBuf::new();

        match self.bridge.load()? {
            Some(state) => {
                self.apply_state(state);
                tracing::info!("Restored panel state");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn save_options(&self) -> PersistenceResult<()> {
        self.bridge.save(&self.state())
    }

    fn batch_request(&self) -> BatchRequest {
        BatchRequest {
            sequences_folder: self.sequences_folder.clone(),
            output_directory: self.output_directory.clone(),
            config: self.targets.clone(),
            resolution: self.resolution,
        }
    }
}

impl std::fmt::Debug for ControlPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPanel")
            .field("targets", &self.targets)
            .field("resolution", &self.resolution)
            .field("output_directory", &self.output_directory)
            .field("sequences_folder", &self.sequences_folder)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

fn log_parse_error(err: ParseError) -> ParseError {
    tracing::error!("{}", err);
    err
}
