//! Log directory resolution
//!
//! Users pass log directories or *prefixes* of log directories. A prefix
//! autocompletes against its parent directory:
//!
//! ```text
//! data/ppo_          →  data/ppo_cartpole, data/ppo_hopper
//! data/ppo_hopper/   →  data/ppo_hopper/   (existing dir + separator: verbatim)
//! ```
//!
//! Selection and exclusion rules then filter the full paths by substring,
//! which makes it easy to pick out ablations launched with similar names.

use crate::{Error, Result};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::info;

const DIV_LINE_WIDTH: usize = 50;

/// Expand directory specs and apply the selection rules.
///
/// * `specs` - directories (with a trailing separator) or prefixes
/// * `select` - keep paths containing **all** of these substrings
/// * `exclude` - drop paths containing **any** of these substrings
///
/// Results preserve the order of `specs`; the matches of one prefix are
/// sorted lexicographically.
///
/// # Errors
///
/// Returns `Error::Io` if the parent directory of a prefix cannot be
/// listed.
///
/// # Example
///
/// ```rust,no_run
/// use trueno_curves::resolve::resolve_logdirs;
///
/// # fn main() -> trueno_curves::Result<()> {
/// let select = vec!["seed0".to_string()];
/// let dirs = resolve_logdirs(&["data/ppo_"], Some(select.as_slice()), None)?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_logdirs<S: AsRef<str>>(
    specs: &[S],
    select: Option<&[String]>,
    exclude: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    let mut logdirs = Vec::new();
    for spec in specs {
        logdirs.extend(expand_spec(spec.as_ref())?);
    }

    if let Some(select) = select {
        logdirs.retain(|dir| {
            let dir = dir.to_string_lossy();
            select.iter().all(|s| dir.contains(s.as_str()))
        });
    }
    if let Some(exclude) = exclude {
        logdirs.retain(|dir| {
            let dir = dir.to_string_lossy();
            !exclude.iter().any(|s| dir.contains(s.as_str()))
        });
    }

    let rule = "=".repeat(DIV_LINE_WIDTH);
    let listing: Vec<String> = logdirs.iter().map(|d| d.display().to_string()).collect();
    info!("Plotting from...\n{rule}\n{}\n{rule}", listing.join("\n"));

    Ok(logdirs)
}

/// Check that a legend, if given, names every resolved directory.
///
/// An empty legend counts as no legend.
///
/// # Errors
///
/// Returns `Error::LegendMismatch` on a length mismatch.
pub fn check_legend(legend: Option<&[String]>, logdirs: usize) -> Result<()> {
    match legend {
        Some(legend) if !legend.is_empty() && legend.len() != logdirs => {
            Err(Error::LegendMismatch {
                legend: legend.len(),
                logdirs,
            })
        }
        _ => Ok(()),
    }
}

fn expand_spec(spec: &str) -> Result<Vec<PathBuf>> {
    if spec.ends_with(MAIN_SEPARATOR) && Path::new(spec).is_dir() {
        return Ok(vec![PathBuf::from(spec)]);
    }

    let (basedir, prefix) = match spec.rfind(MAIN_SEPARATOR) {
        Some(0) => (&spec[..1], &spec[1..]),
        Some(idx) => (&spec[..idx], &spec[idx + 1..]),
        None => ("", spec),
    };
    let listed = if basedir.is_empty() {
        Path::new(".")
    } else {
        Path::new(basedir)
    };
    info!(basedir = %listed.display(), prefix, "expanding prefix");

    let mut names = Vec::new();
    for entry in std::fs::read_dir(listed)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.contains(prefix) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| Path::new(basedir).join(name))
        .collect())
}
