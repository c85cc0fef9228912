//! End-to-end plotting pipeline
//!
//! ```text
//! resolve_logdirs ─→ DatasetLoader::load_all ─→ smooth_column ─→ aggregate_curves ─→ render ─→ show
//!   (prefixes,         (legend check first,       (per run,         (per value         (PNG)
//!    select/exclude)    then per-run skip)         per value)         column)
//! ```

use crate::aggregate::{aggregate_curves, CurveSpec};
use crate::config::PlotConfig;
use crate::display;
use crate::plot::{render, Panel};
use crate::resolve::resolve_logdirs;
use crate::smooth::smooth_column;
use crate::storage::{DatasetLoader, RunDataset};
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Resolve, load, aggregate and render; returns the saved image path.
///
/// Global preconditions fail before any results file is read: an
/// unknown estimator, a legend that does not match the resolved
/// directories. Unreadable runs are skipped with a warning.
///
/// # Errors
///
/// Returns error on a failed precondition, when no run contributes a
/// curve, or when the image cannot be written.
///
/// # Example
///
/// ```rust,no_run
/// use trueno_curves::config::PlotConfig;
/// use trueno_curves::pipeline::make_plots;
///
/// # fn main() -> trueno_curves::Result<()> {
/// let config = PlotConfig::builder(["data/ppo_"])
///     .values(["Performance", "LossPi"])
///     .show(false)
///     .build();
/// let saved = make_plots(&config)?;
/// println!("saved {}", saved.display());
/// # Ok(())
/// # }
/// ```
pub fn make_plots(config: &PlotConfig) -> Result<PathBuf> {
    config.estimator()?;
    let logdirs = resolve_logdirs(&config.logdirs, config.select(), config.exclude())?;

    let mut loader = DatasetLoader::new();
    let datasets = loader.load_all(&logdirs, config.legend())?;
    info!(
        runs = datasets.len(),
        located = loader.registry().run_count(),
        "loaded datasets"
    );

    let panels = build_panels(&datasets, config)?;
    let path = config.output_path()?;
    render(&panels, &config.xaxis, &config.style(), &path)?;
    info!(path = %path.display(), panels = panels.len(), "saved figure");

    if config.show {
        display::show(&path);
    }
    Ok(path)
}

/// Smooth and aggregate every value column into a panel.
///
/// Smoothing is applied per run, before grouping, and only to runs that
/// have the column.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if a value column yields no curve, and
/// `Error::UnknownEstimator` for an unsupported estimator.
pub fn build_panels(datasets: &[RunDataset], config: &PlotConfig) -> Result<Vec<Panel>> {
    let estimator = config.estimator()?;
    if config.values.is_empty() {
        return Err(Error::InvalidInput("No value column to plot".to_string()));
    }

    let mut panels = Vec::with_capacity(config.values.len());
    for value in &config.values {
        let mut smoothed = Vec::with_capacity(datasets.len());
        for dataset in datasets {
            let batch = if dataset.has_column(value) {
                smooth_column(dataset.batch(), value, config.smooth)?
            } else {
                dataset.batch().clone()
            };
            smoothed.push(dataset.clone().with_batch(batch));
        }

        let spec = CurveSpec {
            xaxis: &config.xaxis,
            value,
            condition: config.condition(),
            estimator,
        };
        let curves = aggregate_curves(&smoothed, &spec)?;
        if curves.is_empty() {
            return Err(Error::InvalidInput(format!(
                "No data to plot for {value} against {}. Check the log directories and column names.",
                config.xaxis
            )));
        }
        panels.push(Panel {
            value: value.clone(),
            curves,
        });
    }
    Ok(panels)
}
