//! Durable record of the control panel's state.

use serde::{Deserialize, Serialize};

use crate::models::{ImageFormat, RenderTargetKind};

/// Flat, serializable panel state.
///
/// Formats are stored as their `i8` codes. The level sequence path is kept
/// for compatibility with older records and always written empty. Records
/// written before `custom_material_selected` existed select the custom
/// target whenever a material path is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelStateRecord {
    #[serde(default)]
    pub camera_poses_selected: bool,

    #[serde(default)]
    pub color_image_selected: bool,
    #[serde(default)]
    pub depth_image_selected: bool,
    #[serde(default)]
    pub normal_image_selected: bool,
    #[serde(default)]
    pub optical_flow_image_selected: bool,
    #[serde(default)]
    pub semantic_image_selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_material_selected: Option<bool>,

    pub color_image_format: i8,
    pub depth_image_format: i8,
    pub normal_image_format: i8,
    pub optical_flow_image_format: i8,
    pub semantic_image_format: i8,
    pub custom_material_format: i8,

    /// Empty when no custom material is set.
    #[serde(default)]
    pub custom_material_path: String,

    pub output_width: u32,
    pub output_height: u32,
    pub depth_range_meters: f32,
    pub optical_flow_scale: f32,

    #[serde(default)]
    pub output_directory: String,

    #[serde(default)]
    pub level_sequence_asset_path: String,
}

impl PanelStateRecord {
    /// Stored selection flag of a target.
    pub fn selected(&self, kind: RenderTargetKind) -> bool {
        match kind {
            RenderTargetKind::ColorImage => self.color_image_selected,
            RenderTargetKind::DepthImage => self.depth_image_selected,
            RenderTargetKind::NormalImage => self.normal_image_selected,
            RenderTargetKind::OpticalFlowImage => self.optical_flow_image_selected,
            RenderTargetKind::SemanticImage => self.semantic_image_selected,
            RenderTargetKind::CustomPostProcessMaterial => self
                .custom_material_selected
                .unwrap_or_else(|| !self.custom_material_path.trim().is_empty()),
        }
    }

    pub fn set_selected(&mut self, kind: RenderTargetKind, selected: bool) {
        match kind {
            RenderTargetKind::ColorImage => self.color_image_selected = selected,
            RenderTargetKind::DepthImage => self.depth_image_selected = selected,
            RenderTargetKind::NormalImage => self.normal_image_selected = selected,
            RenderTargetKind::OpticalFlowImage => self.optical_flow_image_selected = selected,
            RenderTargetKind::SemanticImage => self.semantic_image_selected = selected,
            RenderTargetKind::CustomPostProcessMaterial => {
                self.custom_material_selected = Some(selected)
            }
        }
    }

    /// Raw format code for a target.
    pub fn format_code(&self, kind: RenderTargetKind) -> i8 {
        match kind {
            RenderTargetKind::ColorImage => self.color_image_format,
            RenderTargetKind::DepthImage => self.depth_image_format,
            RenderTargetKind::NormalImage => self.normal_image_format,
            RenderTargetKind::OpticalFlowImage => self.optical_flow_image_format,
            RenderTargetKind::SemanticImage => self.semantic_image_format,
            RenderTargetKind::CustomPostProcessMaterial => self.custom_material_format,
        }
    }

    pub fn set_format(&mut self, kind: RenderTargetKind, format: ImageFormat) {
        let code = format.code();
        match kind {
            RenderTargetKind::ColorImage => self.color_image_format = code,
            RenderTargetKind::DepthImage => self.depth_image_format = code,
            RenderTargetKind::NormalImage => self.normal_image_format = code,
            RenderTargetKind::OpticalFlowImage => self.optical_flow_image_format = code,
            RenderTargetKind::SemanticImage => self.semantic_image_format = code,
            RenderTargetKind::CustomPostProcessMaterial => self.custom_material_format = code,
        }
    }
}

impl Default for PanelStateRecord {
    fn default() -> Self {
        Self {
            camera_poses_selected: false,
            color_image_selected: false,
            depth_image_selected: false,
            normal_image_selected: false,
            optical_flow_image_selected: false,
            semantic_image_selected: false,
            custom_material_selected: None,
            color_image_format: ImageFormat::Jpeg.code(),
            depth_image_format: ImageFormat::Exr.code(),
            normal_image_format: ImageFormat::Png.code(),
            optical_flow_image_format: ImageFormat::Png.code(),
            semantic_image_format: ImageFormat::Png.code(),
            custom_material_format: ImageFormat::Png.code(),
            custom_material_path: String::new(),
            output_width: 1920,
            output_height: 1080,
            depth_range_meters: 100.0,
            optical_flow_scale: 1.0,
            output_directory: String::new(),
            level_sequence_asset_path: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_cover_every_field() {
        let mut record = PanelStateRecord::default();
        record.set_selected(RenderTargetKind::OpticalFlowImage, true);
        record.set_format(RenderTargetKind::CustomPostProcessMaterial, ImageFormat::Exr);

        assert!(record.optical_flow_image_selected);
        assert!(record.selected(RenderTargetKind::OpticalFlowImage));
        assert_eq!(record.custom_material_format, 2);

        record.set_selected(RenderTargetKind::CustomPostProcessMaterial, true);
        assert_eq!(record.custom_material_selected, Some(true));
        assert!(record.selected(RenderTargetKind::CustomPostProcessMaterial));
    }

    #[test]
    fn older_records_derive_custom_selection_from_path() {
        let mut record = PanelStateRecord::default();
        assert!(!record.selected(RenderTargetKind::CustomPostProcessMaterial));

        record.custom_material_path = "/Game/M_Mask.M_Mask".to_string();
        assert!(record.selected(RenderTargetKind::CustomPostProcessMaterial));

        record.custom_material_selected = Some(false);
        assert!(!record.selected(RenderTargetKind::CustomPostProcessMaterial));
    }

    #[test]
    fn parses_minimal_toml() {
        let text = r#"
            color_image_format = 0
            depth_image_format = 2
            normal_image_format = 1
            optical_flow_image_format = 1
            semantic_image_format = 1
            custom_material_format = 1
            output_width = 1280
            output_height = 720
            depth_range_meters = 50.0
            optical_flow_scale = 2.0
        "#;
        let record: PanelStateRecord = toml::from_str(text).unwrap();
        assert_eq!(record.output_width, 1280);
        assert!(!record.color_image_selected);
        assert!(record.level_sequence_asset_path.is_empty());
    }
}
