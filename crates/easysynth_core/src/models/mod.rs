//! Data models for the EasySynth control panel.
//!
//! This module contains the core data structures:
//! - Enums for render targets and image formats
//! - The target configuration store
//! - Output image resolution
//! - Asset references returned by discovery

mod assets;
mod enums;
mod resolution;
mod targets;

pub use assets::{AssetKind, AssetRef, PackagePath};
pub use enums::{ImageFormat, ParseError, RenderTargetKind};
pub use resolution::{OutputImageResolution, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
pub use targets::{
    TargetConfiguration, TargetOption, MAX_DEPTH_RANGE_METERS, MAX_OPTICAL_FLOW_SCALE,
    MIN_DEPTH_RANGE_METERS, MIN_OPTICAL_FLOW_SCALE,
};
