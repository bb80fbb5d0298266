//! Filesystem-backed content directory.
//!
//! Stands in for the editor's asset registry in headless hosts. The content
//! root maps to the `/Game` namespace; every file directly inside a folder is
//! an asset whose class is taken from the file extension.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::discovery::{AssetCatalog, FolderResolver, ResolveError};
use crate::models::{AssetKind, AssetRef, PackagePath};

/// Namespace the content root is mounted at.
pub const GAME_ROOT: &str = "/Game";

/// Content directory on disk.
#[derive(Debug, Clone)]
pub struct FsContentDirectory {
    root: PathBuf,
}

impl FsContentDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem folder backing a package path.
    fn folder_for(&self, package: &PackagePath) -> Option<PathBuf> {
        let relative = package.as_str().strip_prefix(GAME_ROOT)?;
        let mut folder = self.root.clone();
        for part in relative.split('/').filter(|p| !p.is_empty()) {
            folder.push(part);
        }
        Some(folder)
    }
}

fn kind_from_extension(extension: &str) -> AssetKind {
    match extension.to_ascii_lowercase().as_str() {
        "levelsequence" => AssetKind::LevelSequence,
        "material" => AssetKind::Material,
        other => AssetKind::Other(other.to_string()),
    }
}

impl FolderResolver for FsContentDirectory {
    fn resolve_folder(&self, folder: &Path) -> Result<PackagePath, ResolveError> {
        if folder.as_os_str().is_empty() {
            return Err(ResolveError::Empty);
        }

        let folder_abs = fs::canonicalize(folder)
            .map_err(|_| ResolveError::Missing(folder.display().to_string()))?;
        let root_abs = fs::canonicalize(&self.root)
            .map_err(|_| ResolveError::OutsideContent(folder.display().to_string()))?;

        let relative = folder_abs
            .strip_prefix(&root_abs)
            .map_err(|_| ResolveError::OutsideContent(folder.display().to_string()))?;

        let mut package = String::from(GAME_ROOT);
        for component in relative.components() {
            if let Component::Normal(part) = component {
                package.push('/');
                package.push_str(&part.to_string_lossy());
            }
        }

        Ok(PackagePath::new(package))
    }
}

impl AssetCatalog for FsContentDirectory {
    fn list_assets(&self, package: &PackagePath) -> Vec<AssetRef> {
        let Some(folder) = self.folder_for(package) else {
            tracing::warn!("Package {} is not under {}", package, GAME_ROOT);
            return Vec::new();
        };

        let entries = match fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list {}: {}", folder.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        files
            .iter()
            .filter_map(|path| {
                let name = path.file_stem()?.to_string_lossy().to_string();
                let extension = path.extension()?.to_string_lossy().to_string();
                Some(AssetRef::new(package, name, kind_from_extension(&extension)))
            })
            .collect()
    }
}
