//! Asset references handed out by the asset discovery collaborator.

use serde::{Deserialize, Serialize};

/// Class tag of a discovered asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    LevelSequence,
    Material,
    Other(String),
}

/// Content namespace a folder resolves to, e.g. `/Game/Sequences`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackagePath(String);

impl PackagePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackagePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single asset found under a package path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset name, used for the per-sequence output folder.
    pub name: String,
    /// Full object path (`/Game/Folder/Name.Name`).
    pub object_path: String,
    pub kind: AssetKind,
}

impl AssetRef {
    /// Build a reference inside `package`, deriving the object path.
    pub fn new(package: &PackagePath, name: impl Into<String>, kind: AssetKind) -> Self {
        let name = name.into();
        let object_path = format!("{}/{}.{}", package.as_str().trim_end_matches('/'), name, name);
        Self {
            name,
            object_path,
            kind,
        }
    }

    pub fn is_level_sequence(&self) -> bool {
        self.kind == AssetKind::LevelSequence
    }
}
