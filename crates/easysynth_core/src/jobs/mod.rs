//! Render jobs and sequence discovery.
//!
//! This module provides:
//! - `SequenceRenderJob`: one sequence plus its output folder
//! - `FolderResolver` / `AssetCatalog`: seams onto the asset registry
//! - `discover_sequences`: folder listing to ordered job list
//! - `FsContentDirectory`: filesystem implementation of both seams

mod content_dir;
mod discovery;
mod types;

pub use content_dir::{FsContentDirectory, GAME_ROOT};
pub use discovery::{
    discover_sequences, AssetCatalog, AssetRegistry, FolderResolver, ResolveError,
};
pub use types::SequenceRenderJob;
