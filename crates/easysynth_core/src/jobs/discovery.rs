//! Sequence discovery from a content folder.
//!
//! Folder resolution and asset listing are external collaborators; this
//! module only defines their seams and turns a listing into render jobs.

use std::path::Path;

use thiserror::Error;

use super::types::SequenceRenderJob;
use crate::models::{AssetRef, PackagePath};

/// The selected folder does not map to a content namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Folder is not inside the content directory: {0}")]
    OutsideContent(String),

    #[error("Folder does not exist: {0}")]
    Missing(String),

    #[error("Folder path is empty")]
    Empty,
}

/// Maps a filesystem folder to a content package path.
pub trait FolderResolver {
    fn resolve_folder(&self, folder: &Path) -> Result<PackagePath, ResolveError>;
}

/// Lists the assets directly under a package path.
pub trait AssetCatalog {
    /// Order of the returned list is the order sequences are rendered in.
    fn list_assets(&self, package: &PackagePath) -> Vec<AssetRef>;
}

/// Both registry seams behind one handle.
pub trait AssetRegistry: FolderResolver + AssetCatalog {}

impl<T: FolderResolver + AssetCatalog> AssetRegistry for T {}

/// Build one job per level sequence, keeping catalog order.
pub fn discover_sequences<C: AssetCatalog + ?Sized>(
    catalog: &C,
    package: &PackagePath,
    base_output_directory: &Path,
) -> Vec<SequenceRenderJob> {
    let assets = catalog.list_assets(package);
    let total = assets.len();

    let jobs: Vec<SequenceRenderJob> = assets
        .into_iter()
        .filter(AssetRef::is_level_sequence)
        .map(|asset| SequenceRenderJob::new(asset, base_output_directory))
        .collect();

    tracing::info!(
        "Discovered {} level sequences among {} assets in {}",
        jobs.len(),
        total,
        package
    );

    jobs
}
