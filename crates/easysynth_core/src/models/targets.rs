//! Render target configuration store.
//!
//! Holds the per-target selection flags and output formats together with
//! the depth range, optical flow scale and custom material reference.
//! Pure in-memory state; persistence lives in `crate::persistence`.

use super::enums::{ImageFormat, RenderTargetKind};

/// Smallest depth range accepted by the panel, in meters.
pub const MIN_DEPTH_RANGE_METERS: f32 = 0.01;
/// Largest depth range accepted by the panel, in meters.
pub const MAX_DEPTH_RANGE_METERS: f32 = 10_000.0;
/// Optical flow scale coefficient bounds.
pub const MIN_OPTICAL_FLOW_SCALE: f32 = 1.0;
pub const MAX_OPTICAL_FLOW_SCALE: f32 = 100.0;

const DEFAULT_DEPTH_RANGE_METERS: f32 = 100.0;
const DEFAULT_OPTICAL_FLOW_SCALE: f32 = 1.0;

/// Selection flag and output format of a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetOption {
    pub selected: bool,
    pub format: ImageFormat,
}

/// Which targets to render and how.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfiguration {
    targets: [TargetOption; RenderTargetKind::COUNT],
    export_camera_poses: bool,
    depth_range_meters: f32,
    optical_flow_scale: f32,
    custom_material: Option<String>,
}

impl Default for TargetConfiguration {
    fn default() -> Self {
        let mut targets = [TargetOption {
            selected: false,
            format: ImageFormat::Png,
        }; RenderTargetKind::COUNT];
        targets[RenderTargetKind::ColorImage.index()].format = ImageFormat::Jpeg;
        targets[RenderTargetKind::DepthImage.index()].format = ImageFormat::Exr;

        Self {
            targets,
            export_camera_poses: false,
            depth_range_meters: DEFAULT_DEPTH_RANGE_METERS,
            optical_flow_scale: DEFAULT_OPTICAL_FLOW_SCALE,
            custom_material: None,
        }
    }
}

impl TargetConfiguration {
    /// Whether a target will be rendered.
    ///
    /// The custom material target only counts while a material is set.
    pub fn selected(&self, kind: RenderTargetKind) -> bool {
        let option = self.targets[kind.index()];
        match kind {
            RenderTargetKind::CustomPostProcessMaterial => {
                option.selected && self.custom_material.is_some()
            }
            _ => option.selected,
        }
    }

    /// Raw selection flag, ignoring the custom material precondition.
    pub fn selection_flag(&self, kind: RenderTargetKind) -> bool {
        self.targets[kind.index()].selected
    }

    pub fn set_selected(&mut self, kind: RenderTargetKind, selected: bool) {
        if kind == RenderTargetKind::CustomPostProcessMaterial
            && selected
            && self.custom_material.is_none()
        {
            tracing::debug!("Custom material target selected without a material set");
        }
        self.targets[kind.index()].selected = selected;
    }

    pub fn format(&self, kind: RenderTargetKind) -> ImageFormat {
        self.targets[kind.index()].format
    }

    pub fn set_format(&mut self, kind: RenderTargetKind, format: ImageFormat) {
        self.targets[kind.index()].format = format;
    }

    /// True iff at least one of the five primary targets is selected.
    pub fn any_selected(&self) -> bool {
        RenderTargetKind::PRIMARY
            .iter()
            .any(|kind| self.targets[kind.index()].selected)
    }

    /// Targets that will actually be rendered, in panel order.
    pub fn active_targets(&self) -> Vec<RenderTargetKind> {
        RenderTargetKind::all()
            .iter()
            .copied()
            .filter(|kind| self.selected(*kind))
            .collect()
    }

    pub fn export_camera_poses(&self) -> bool {
        self.export_camera_poses
    }

    pub fn set_export_camera_poses(&mut self, export: bool) {
        self.export_camera_poses = export;
    }

    pub fn depth_range_meters(&self) -> f32 {
        self.depth_range_meters
    }

    /// Set the depth range, clamped to `[0.01, 10000]` meters.
    pub fn set_depth_range_meters(&mut self, meters: f32) {
        self.depth_range_meters = clamp_finite(
            meters,
            MIN_DEPTH_RANGE_METERS,
            MAX_DEPTH_RANGE_METERS,
            DEFAULT_DEPTH_RANGE_METERS,
        );
    }

    pub fn optical_flow_scale(&self) -> f32 {
        self.optical_flow_scale
    }

    /// Set the optical flow scale coefficient, clamped to `[1, 100]`.
    pub fn set_optical_flow_scale(&mut self, scale: f32) {
        self.optical_flow_scale = clamp_finite(
            scale,
            MIN_OPTICAL_FLOW_SCALE,
            MAX_OPTICAL_FLOW_SCALE,
            DEFAULT_OPTICAL_FLOW_SCALE,
        );
    }

    /// Object path of the custom post-process material, if any.
    pub fn custom_material(&self) -> Option<&str> {
        self.custom_material.as_deref()
    }

    /// Set or clear the custom material.
    ///
    /// Picking a material selects its target; clearing it deselects it.
    pub fn set_custom_material(&mut self, material: Option<String>) {
        let material = material.filter(|m| !m.trim().is_empty());
        self.targets[RenderTargetKind::CustomPostProcessMaterial.index()].selected =
            material.is_some();
        self.custom_material = material;
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        tracing::error!("Rejected NaN value, using {}", fallback);
        return fallback;
    }
    value.clamp(min, max)
}
