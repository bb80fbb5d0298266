//! Render job types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::AssetRef;

/// One sequence of a batch, with the folder its images go to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRenderJob {
    sequence: AssetRef,
    output_directory: PathBuf,
}

impl SequenceRenderJob {
    /// Create a job rendering into `base_output_directory/<sequence name>`.
    pub fn new(sequence: AssetRef, base_output_directory: &Path) -> Self {
        let output_directory = base_output_directory.join(&sequence.name);
        Self {
            sequence,
            output_directory,
        }
    }

    pub fn sequence(&self) -> &AssetRef {
        &self.sequence
    }

    pub fn name(&self) -> &str {
        &self.sequence.name
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetKind, PackagePath};

    #[test]
    fn output_directory_is_base_plus_name() {
        let package = PackagePath::new("/Game/Shots");
        let asset = AssetRef::new(&package, "Shot020", AssetKind::LevelSequence);
        let job = SequenceRenderJob::new(asset, Path::new("/renders"));

        assert_eq!(job.name(), "Shot020");
        assert_eq!(job.output_directory(), Path::new("/renders/Shot020"));
    }
}
