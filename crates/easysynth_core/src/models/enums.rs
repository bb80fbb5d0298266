//! Core enums used throughout the control panel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a name or code does not map to a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown render target '{0}'")]
    UnknownTarget(String),

    #[error("Unknown image format '{0}'")]
    UnknownFormat(String),

    #[error("Image format code {0} is out of range")]
    FormatCodeOutOfRange(i8),
}

/// One category of output imagery produced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTargetKind {
    ColorImage,
    DepthImage,
    NormalImage,
    OpticalFlowImage,
    SemanticImage,
    CustomPostProcessMaterial,
}

impl RenderTargetKind {
    /// Number of target kinds.
    pub const COUNT: usize = 6;

    /// The five targets that count towards "anything selected".
    pub const PRIMARY: [RenderTargetKind; 5] = [
        Self::ColorImage,
        Self::DepthImage,
        Self::NormalImage,
        Self::OpticalFlowImage,
        Self::SemanticImage,
    ];

    /// Get all target kinds in panel order.
    pub fn all() -> &'static [RenderTargetKind] {
        &[
            Self::ColorImage,
            Self::DepthImage,
            Self::NormalImage,
            Self::OpticalFlowImage,
            Self::SemanticImage,
            Self::CustomPostProcessMaterial,
        ]
    }

    /// Dense index used for per-target storage.
    pub fn index(&self) -> usize {
        match self {
            Self::ColorImage => 0,
            Self::DepthImage => 1,
            Self::NormalImage => 2,
            Self::OpticalFlowImage => 3,
            Self::SemanticImage => 4,
            Self::CustomPostProcessMaterial => 5,
        }
    }

    /// Whether this is one of the five primary targets.
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::CustomPostProcessMaterial)
    }

    /// Short machine name (CLI flags, renderer arguments).
    pub fn key(&self) -> &'static str {
        match self {
            Self::ColorImage => "color",
            Self::DepthImage => "depth",
            Self::NormalImage => "normal",
            Self::OpticalFlowImage => "optical_flow",
            Self::SemanticImage => "semantic",
            Self::CustomPostProcessMaterial => "custom_material",
        }
    }

    /// Human-readable label as shown next to the target checkbox.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ColorImage => "Color images",
            Self::DepthImage => "Depth images",
            Self::NormalImage => "Normal images",
            Self::OpticalFlowImage => "Optical flow images",
            Self::SemanticImage => "Semantic images",
            Self::CustomPostProcessMaterial => "Custom PP material",
        }
    }

    /// Parse a target from its machine name.
    pub fn from_key(key: &str) -> Result<Self, ParseError> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.key() == key)
            .ok_or_else(|| ParseError::UnknownTarget(key.to_string()))
    }
}

impl std::fmt::Display for RenderTargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for RenderTargetKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

/// Output image encoding for a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Exr,
}

impl ImageFormat {
    /// Get all formats in combo box order.
    pub fn all() -> &'static [ImageFormat] {
        &[Self::Jpeg, Self::Png, Self::Exr]
    }

    /// Display name used by the format combo box.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Exr => "exr",
        }
    }

    /// Small integer code stored in the persisted panel state.
    pub fn code(&self) -> i8 {
        match self {
            Self::Jpeg => 0,
            Self::Png => 1,
            Self::Exr => 2,
        }
    }

    /// Decode a persisted format code.
    pub fn from_code(code: i8) -> Result<Self, ParseError> {
        match code {
            0 => Ok(Self::Jpeg),
            1 => Ok(Self::Png),
            2 => Ok(Self::Exr),
            other => Err(ParseError::FormatCodeOutOfRange(other)),
        }
    }

    /// Parse a format from its display name.
    pub fn from_name(name: &str) -> Result<Self, ParseError> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.name() == name)
            .ok_or_else(|| ParseError::UnknownFormat(name.to_string()))
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<i8> for ImageFormat {
    type Error = ParseError;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}
