//! Stage directories under a sound library.
//!
//! ```text
//! <library>/                              raw assets
//! <library>/PROCESSED/                    standardized mono files
//! <library>/PROCESSED/VARIANTS/           pitch variants
//! <library>/PROCESSED/VOLUMEPROCESSED/    automated multi-channel renders
//! <library>/MIX/                          final renders
//! ```
//!
//! Every stage writes into a directory no earlier stage reads, so running
//! the tool again never feeds an output back in as a source.

use std::path::{Path, PathBuf};

use crate::job::Stage;

/// Name of the standardized-output directory.
pub const PROCESSED_DIR: &str = "PROCESSED";

/// Name of the pitch-variant directory inside [`PROCESSED_DIR`].
pub const VARIANTS_DIR: &str = "VARIANTS";

/// Name of the automated-output directory inside [`PROCESSED_DIR`].
pub const AUTOMATED_DIR: &str = "VOLUMEPROCESSED";

/// Name of the final-render directory.
pub const MIX_DIR: &str = "MIX";

/// Resolves stage directories for one library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of raw source assets.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Standardized mono assets.
    pub fn processed(&self) -> PathBuf {
        self.root.join(PROCESSED_DIR)
    }

    /// Pitch variants of the standardized assets.
    pub fn variants(&self) -> PathBuf {
        self.processed().join(VARIANTS_DIR)
    }

    /// Automated renders.
    pub fn automated(&self) -> PathBuf {
        self.processed().join(AUTOMATED_DIR)
    }

    /// Final renders.
    pub fn mixes(&self) -> PathBuf {
        self.root.join(MIX_DIR)
    }

    /// Directory a stage writes into.
    pub fn output_dir(&self, stage: Stage) -> PathBuf {
        match stage {
            Stage::Standardize => self.processed(),
            Stage::PitchShift => self.variants(),
            Stage::Automate => self.automated(),
            Stage::Mix => self.mixes(),
        }
    }

    /// Directories a stage reads its inputs from.
    ///
    /// Automation covers both the standardized assets and their variants.
    pub fn input_dirs(&self, stage: Stage) -> Vec<PathBuf> {
        match stage {
            Stage::Standardize => vec![self.root.clone()],
            Stage::PitchShift => vec![self.processed()],
            Stage::Automate => vec![self.processed(), self.variants()],
            Stage::Mix => vec![self.automated()],
        }
    }
}
