//! Mapping between the live panel state and its stored record.

use std::path::PathBuf;

use super::record::PanelStateRecord;
use super::store::{PersistenceError, PersistenceResult, RecordStore};
use crate::models::{ImageFormat, OutputImageResolution, RenderTargetKind, TargetConfiguration};

/// Name of the record holding the panel state.
pub const PANEL_STATE_RECORD: &str = "panel_state";

/// Panel state that survives between sessions.
///
/// The sequences folder is deliberately absent: it is never restored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    pub targets: TargetConfiguration,
    pub resolution: OutputImageResolution,
    pub output_directory: PathBuf,
}

/// Loads and saves [`PanelState`] through a [`RecordStore`].
pub struct PersistenceBridge {
    store: Box<dyn RecordStore>,
    record_name: String,
}

impl PersistenceBridge {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            store,
            record_name: PANEL_STATE_RECORD.to_string(),
        }
    }

    /// Read the stored state. `None` when nothing was saved yet.
    pub fn load(&self) -> PersistenceResult<Option<PanelState>> {
        match self.store.load_record(&self.record_name)? {
            Some(record) => Ok(Some(state_from_record(&record)?)),
            None => {
                tracing::info!("No saved panel state, keeping defaults");
                Ok(None)
            }
        }
    }

    /// Write the state, creating the record on first save.
    pub fn save(&self, state: &PanelState) -> PersistenceResult<()> {
        let mut record = match self.store.load_record(&self.record_name) {
            Ok(Some(record)) => record,
            Ok(None) => self.store.create_record(&self.record_name),
            Err(e) => {
                tracing::warn!("Replacing unreadable panel state record: {}", e);
                self.store.create_record(&self.record_name)
            }
        };

        overwrite_record(&mut record, state);
        self.store.save_record(&self.record_name, &record)?;

        tracing::info!("Saved panel state '{}'", self.record_name);
        Ok(())
    }
}

impl std::fmt::Debug for PersistenceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceBridge")
            .field("record_name", &self.record_name)
            .finish()
    }
}

/// Copy every field of `state` into `record`.
fn overwrite_record(record: &mut PanelStateRecord, state: &PanelState) {
    let targets = &state.targets;

    record.camera_poses_selected = targets.export_camera_poses();
    for kind in RenderTargetKind::all() {
        record.set_selected(*kind, targets.selection_flag(*kind));
        record.set_format(*kind, targets.format(*kind));
    }
    record.custom_material_path = targets.custom_material().unwrap_or_default().to_string();

    record.output_width = state.resolution.width();
    record.output_height = state.resolution.height();
    record.depth_range_meters = targets.depth_range_meters();
    record.optical_flow_scale = targets.optical_flow_scale();
    record.output_directory = state.output_directory.display().to_string();
    record.level_sequence_asset_path = String::new();
}

fn state_from_record(record: &PanelStateRecord) -> PersistenceResult<PanelState> {
    let mut targets = TargetConfiguration::default();

    targets.set_export_camera_poses(record.camera_poses_selected);
    for kind in RenderTargetKind::all() {
        let code = record.format_code(*kind);
        let format = ImageFormat::from_code(code)
            .map_err(|_| PersistenceError::InvalidFormatCode { target: *kind, code })?;
        targets.set_format(*kind, format);
    }

    let material = Some(record.custom_material_path.clone()).filter(|p| !p.trim().is_empty());
    targets.set_custom_material(material);

    // After the material, which resets the custom flag.
    for kind in RenderTargetKind::all() {
        targets.set_selected(*kind, record.selected(*kind));
    }

    targets.set_depth_range_meters(record.depth_range_meters);
    targets.set_optical_flow_scale(record.optical_flow_scale);

    Ok(PanelState {
        targets,
        resolution: OutputImageResolution::new(record.output_width, record.output_height),
        output_directory: PathBuf::from(&record.output_directory),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::TomlRecordStore;
    use tempfile::TempDir;

    fn sample_state() -> PanelState {
        let mut targets = TargetConfiguration::default();
        targets.set_selected(RenderTargetKind::ColorImage, true);
        targets.set_selected(RenderTargetKind::OpticalFlowImage, true);
        targets.set_format(RenderTargetKind::NormalImage, ImageFormat::Exr);
        targets.set_format(RenderTargetKind::ColorImage, ImageFormat::Png);
        targets.set_export_camera_poses(true);
        targets.set_depth_range_meters(42.5);
        targets.set_optical_flow_scale(7.0);
        targets.set_custom_material(Some("/Game/Materials/M_Outline".to_string()));

        PanelState {
            targets,
            resolution: OutputImageResolution::new(1280, 720),
            output_directory: PathBuf::from("/renders/run1"),
        }
    }

    fn bridge(dir: &TempDir) -> PersistenceBridge {
        PersistenceBridge::new(Box::new(TomlRecordStore::new(dir.path())))
    }

    #[test]
    fn load_without_record_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(bridge(&dir).load().unwrap(), None);
    }

    #[test]
    fn save_then_load_is_exact() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);
        let state = sample_state();

        bridge.save(&state).unwrap();
        assert_eq!(bridge.load().unwrap(), Some(state));
    }

    #[test]
    fn custom_selection_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);

        let mut deselected = sample_state();
        deselected
            .targets
            .set_selected(RenderTargetKind::CustomPostProcessMaterial, false);
        bridge.save(&deselected).unwrap();
        let loaded = bridge.load().unwrap().unwrap();
        assert!(!loaded
            .targets
            .selection_flag(RenderTargetKind::CustomPostProcessMaterial));
        assert_eq!(loaded, deselected);

        let mut without_material = sample_state();
        without_material.targets.set_custom_material(None);
        without_material
            .targets
            .set_selected(RenderTargetKind::CustomPostProcessMaterial, true);
        bridge.save(&without_material).unwrap();
        assert_eq!(bridge.load().unwrap(), Some(without_material));
    }

    #[test]
    fn record_without_custom_flag_selects_material_target() {
        let dir = TempDir::new().unwrap();
        let store = TomlRecordStore::new(dir.path());
        let mut record = PanelStateRecord::default();
        record.custom_material_path = "/Game/M_Mask.M_Mask".to_string();
        store.save_record(PANEL_STATE_RECORD, &record).unwrap();

        let loaded = bridge(&dir).load().unwrap().unwrap();
        assert!(loaded
            .targets
            .selected(RenderTargetKind::CustomPostProcessMaterial));
    }

    #[test]
    fn loaded_values_are_normalized() {
        let dir = TempDir::new().unwrap();
        let store = TomlRecordStore::new(dir.path());
        let mut record = PanelStateRecord::default();
        record.output_width = 1281;
        record.output_height = 50_000;
        record.depth_range_meters = -3.0;
        record.optical_flow_scale = 500.0;
        store.save_record(PANEL_STATE_RECORD, &record).unwrap();

        let loaded = bridge(&dir).load().unwrap().unwrap();
        assert_eq!(loaded.resolution.width(), 1280);
        assert_eq!(loaded.resolution.height(), 2160);
        assert_eq!(loaded.targets.depth_range_meters(), 0.01);
        assert_eq!(loaded.targets.optical_flow_scale(), 100.0);
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        let bridge = bridge(&dir);
        bridge.save(&sample_state()).unwrap();

        let mut state = sample_state();
        state.targets.set_custom_material(None);
        state.targets.set_selected(RenderTargetKind::ColorImage, false);
        state.output_directory = PathBuf::new();
        bridge.save(&state).unwrap();

        let loaded = bridge.load().unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.targets.custom_material(), None);
    }

    #[test]
    fn legacy_sequence_path_is_written_empty() {
        let dir = TempDir::new().unwrap();
        let store = TomlRecordStore::new(dir.path());
        let mut record = PanelStateRecord::default();
        record.level_sequence_asset_path = "/Game/Old/Seq".to_string();
        store.save_record(PANEL_STATE_RECORD, &record).unwrap();

        bridge(&dir).save(&sample_state()).unwrap();

        let stored = store.load_record(PANEL_STATE_RECORD).unwrap().unwrap();
        assert!(stored.level_sequence_asset_path.is_empty());
    }

    #[test]
    fn out_of_range_format_code_fails() {
        let dir = TempDir::new().unwrap();
        let store = TomlRecordStore::new(dir.path());
        let mut record = PanelStateRecord::default();
        record.depth_image_format = 7;
        store.save_record(PANEL_STATE_RECORD, &record).unwrap();

        let err = bridge(&dir).load().unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::InvalidFormatCode {
                target: RenderTargetKind::DepthImage,
                code: 7
            }
        ));
    }
}
