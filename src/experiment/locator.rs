//! Run Locator - recursive discovery of run directories
//!
//! A directory is a run when it directly contains the results file. Its
//! sibling metadata file supplies the experiment name; a run without
//! readable metadata is skipped.

use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{RunMetadata, RunRecord, METADATA_FILE, RESULTS_FILE};

/// Find every run under `logdir`, sorted by experiment name.
///
/// Directory entries are visited in file-name order, and the final sort
/// is stable, so runs sharing a name keep their discovery order. Runs
/// without a name sort first. Unreadable directories are logged and
/// skipped.
///
/// # Example
///
/// ```rust,no_run
/// use trueno_curves::experiment::locate_runs;
///
/// for run in locate_runs("data/ppo_cartpole/") {
///     println!("{:?} {}", run.exp_name(), run.root().display());
/// }
/// ```
#[must_use]
pub fn locate_runs<P: AsRef<Path>>(logdir: P) -> Vec<RunRecord> {
    let logdir = logdir.as_ref();
    let mut runs = Vec::new();

    for entry in WalkDir::new(logdir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(logdir = %logdir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let root = entry.path();
        if !root.join(RESULTS_FILE).is_file() {
            continue;
        }

        match RunMetadata::from_path(root.join(METADATA_FILE)) {
            Ok(metadata) => runs.push(RunRecord::new(root, metadata.exp_name())),
            Err(e) => warn!(run = %root.display(), error = %e, "no usable {METADATA_FILE}, skipping run"),
        }
    }

    runs.sort_by(|a, b| a.exp_name().cmp(&b.exp_name()));

    for run in &runs {
        info!(exp_name = run.exp_name().unwrap_or("-"), root = %run.root().display(), "found run");
    }

    runs
}
