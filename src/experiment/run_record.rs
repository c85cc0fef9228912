//! Run Record - a discovered run directory

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::RESULTS_FILE;

/// Run Record represents one training job's output directory.
///
/// Produced by the run locator. The experiment name comes from the
/// run's metadata file and may be absent, in which case the loader falls
/// back to a default label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    root: PathBuf,
    exp_name: Option<String>,
}

impl RunRecord {
    /// Create a new run record.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory containing the results file
    /// * `exp_name` - Experiment name recovered from metadata, if any
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, exp_name: Option<String>) -> Self {
        Self {
            root: root.into(),
            exp_name,
        }
    }

    /// Get the run directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the experiment name, if the metadata carried one.
    #[must_use]
    pub fn exp_name(&self) -> Option<&str> {
        self.exp_name.as_deref()
    }

    /// Path of the run's results table.
    #[must_use]
    pub fn results_path(&self) -> PathBuf {
        self.root.join(RESULTS_FILE)
    }
}
