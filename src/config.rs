//! Plot configuration
//!
//! [`PlotConfig`] carries every knob of one [`make_plots`] invocation.
//! Defaults match the command-line defaults:
//!
//! | Field        | Default              |
//! |--------------|----------------------|
//! | `logdirs`    | `["data/"]`          |
//! | `xaxis`      | `TotalEnvInteracts`  |
//! | `values`     | `["Performance"]`    |
//! | `smooth`     | 20                   |
//! | `linewidth`  | 4.0                  |
//! | `estimator`  | `mean`               |
//! | `font_scale` | 1.75                 |
//! | `dpi`        | 300                  |
//! | `show`       | true                 |
//!
//! [`make_plots`]: crate::pipeline::make_plots

use crate::aggregate::Estimator;
use crate::plot::PlotStyle;
use crate::storage::{CONDITION1_COLUMN, CONDITION2_COLUMN, PERFORMANCE_COLUMN};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default log directory.
pub const DEFAULT_LOGDIR: &str = "data/";

/// Default x-axis column.
pub const DEFAULT_XAXIS: &str = "TotalEnvInteracts";

/// File name appended to the first log directory.
pub const OUTPUT_FILE: &str = "ep_reward.png";

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Log directories or prefixes, as given by the user
    pub logdirs: Vec<String>,
    /// One label per resolved directory (empty: use experiment names)
    pub legend: Vec<String>,
    /// X-axis column
    pub xaxis: String,
    /// Value columns, one panel each
    pub values: Vec<String>,
    /// Plot every run separately instead of aggregating seeds
    pub count: bool,
    /// Moving-average window (1 disables smoothing)
    pub smooth: usize,
    /// Curve line width in points
    pub linewidth: f64,
    /// Keep directories containing all of these substrings
    pub select: Vec<String>,
    /// Drop directories containing any of these substrings
    pub exclude: Vec<String>,
    /// Estimator name (`mean`, `median`, `min`, `max`, `sum`)
    pub estimator: String,
    /// Font size multiplier
    pub font_scale: f64,
    /// Output resolution
    pub dpi: u32,
    /// Try to open the saved figure
    pub show: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        let style = PlotStyle::default();
        Self {
            logdirs: vec![DEFAULT_LOGDIR.to_string()],
            legend: Vec::new(),
            xaxis: DEFAULT_XAXIS.to_string(),
            values: vec![PERFORMANCE_COLUMN.to_string()],
            count: false,
            smooth: 20,
            linewidth: style.linewidth,
            select: Vec::new(),
            exclude: Vec::new(),
            estimator: Estimator::default().name().to_string(),
            font_scale: style.font_scale,
            dpi: style.dpi,
            show: true,
        }
    }
}

impl PlotConfig {
    /// Create a builder starting from the defaults.
    ///
    /// # Arguments
    ///
    /// * `logdirs` - log directories or prefixes
    #[must_use]
    pub fn builder<I, S>(logdirs: I) -> PlotConfigBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlotConfigBuilder::new(logdirs)
    }

    /// Grouping column: `Condition2` when counting runs separately,
    /// `Condition1` otherwise.
    #[must_use]
    pub const fn condition(&self) -> &'static str {
        if self.count {
            CONDITION2_COLUMN
        } else {
            CONDITION1_COLUMN
        }
    }

    /// Legend, if one was given.
    #[must_use]
    pub fn legend(&self) -> Option<&[String]> {
        (!self.legend.is_empty()).then_some(self.legend.as_slice())
    }

    /// Selection substrings, if any.
    #[must_use]
    pub fn select(&self) -> Option<&[String]> {
        (!self.select.is_empty()).then_some(self.select.as_slice())
    }

    /// Exclusion substrings, if any.
    #[must_use]
    pub fn exclude(&self) -> Option<&[String]> {
        (!self.exclude.is_empty()).then_some(self.exclude.as_slice())
    }

    /// Parsed estimator.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEstimator` for an unsupported name.
    pub fn estimator(&self) -> Result<Estimator> {
        self.estimator.parse()
    }

    /// Where the figure is saved: the first log directory as given, with
    /// the file name appended verbatim.
    ///
    /// `data/` gives `data/ep_reward.png`, while a prefix such as
    /// `data/ppo` gives `data/ppoep_reward.png`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if no log directory is configured.
    pub fn output_path(&self) -> Result<PathBuf> {
        self.logdirs
            .first()
            .map(|first| PathBuf::from(format!("{first}{OUTPUT_FILE}")))
            .ok_or_else(|| Error::InvalidInput("No log directory given".to_string()))
    }

    /// Rendering style.
    #[must_use]
    pub const fn style(&self) -> PlotStyle {
        PlotStyle {
            linewidth: self.linewidth,
            font_scale: self.font_scale,
            dpi: self.dpi,
        }
    }
}

/// Builder for `PlotConfig`.
#[derive(Debug)]
pub struct PlotConfigBuilder {
    config: PlotConfig,
}

impl PlotConfigBuilder {
    /// Create a builder with the given log directories and defaults
    /// elsewhere.
    #[must_use]
    pub fn new<I, S>(logdirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: PlotConfig {
                logdirs: logdirs.into_iter().map(Into::into).collect(),
                ..PlotConfig::default()
            },
        }
    }

    /// Set the legend labels.
    #[must_use]
    pub fn legend<I, S>(mut self, legend: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.legend = legend.into_iter().map(Into::into).collect();
        self
    }

    /// Set the x-axis column.
    #[must_use]
    pub fn xaxis(mut self, xaxis: impl Into<String>) -> Self {
        self.config.xaxis = xaxis.into();
        self
    }

    /// Set the value columns.
    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Plot every run separately.
    #[must_use]
    pub const fn count(mut self, count: bool) -> Self {
        self.config.count = count;
        self
    }

    /// Set the smoothing window.
    #[must_use]
    pub const fn smooth(mut self, window: usize) -> Self {
        self.config.smooth = window;
        self
    }

    /// Set the line width in points.
    #[must_use]
    pub const fn linewidth(mut self, linewidth: f64) -> Self {
        self.config.linewidth = linewidth;
        self
    }

    /// Set the selection substrings.
    #[must_use]
    pub fn select<I, S>(mut self, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.select = select.into_iter().map(Into::into).collect();
        self
    }

    /// Set the exclusion substrings.
    #[must_use]
    pub fn exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Set the estimator name.
    #[must_use]
    pub fn estimator(mut self, estimator: impl Into<String>) -> Self {
        self.config.estimator = estimator.into();
        self
    }

    /// Set the font scale.
    #[must_use]
    pub const fn font_scale(mut self, font_scale: f64) -> Self {
        self.config.font_scale = font_scale;
        self
    }

    /// Set the output resolution.
    #[must_use]
    pub const fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    /// Enable or disable opening the saved figure.
    #[must_use]
    pub const fn show(mut self, show: bool) -> Self {
        self.config.show = show;
        self
    }

    /// Build the `PlotConfig`.
    #[must_use]
    pub fn build(self) -> PlotConfig {
        self.config
    }
}
