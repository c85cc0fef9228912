//! Command-line arguments

use crate::config::{PlotConfig, DEFAULT_LOGDIR, DEFAULT_XAXIS};
use crate::storage::PERFORMANCE_COLUMN;
use clap::Parser;

/// Plot learning curves from reinforcement-learning experiment logs.
///
/// Runs are discovered recursively (any directory holding a
/// `progress.txt`), grouped by the `exp_name` of their `config.json`,
/// and averaged across seeds with a standard-deviation band.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Log directories, or prefixes of log directories to autocomplete
    #[arg(value_name = "LOGDIR", default_value = DEFAULT_LOGDIR)]
    pub logdir: Vec<String>,

    /// Legend label for each resolved directory (overrides `exp_name`)
    #[arg(short, long, num_args = 0..)]
    pub legend: Vec<String>,

    /// Column for the x axis
    #[arg(short, long, default_value = DEFAULT_XAXIS)]
    pub xaxis: String,

    /// Columns to plot, one panel each
    #[arg(short = 'y', long = "value", num_args = 1.., default_value = PERFORMANCE_COLUMN)]
    pub values: Vec<String>,

    /// Plot every run separately instead of averaging seeds
    #[arg(long)]
    pub count: bool,

    /// Moving-average window (1 disables smoothing)
    #[arg(short, long, default_value_t = 20)]
    pub smooth: usize,

    /// Curve line width in points
    #[arg(long, visible_alias = "lw", default_value_t = 4.0)]
    pub linewidth: f64,

    /// Only plot directories containing all of these substrings
    #[arg(long, num_args = 0..)]
    pub select: Vec<String>,

    /// Skip directories containing any of these substrings
    #[arg(long, num_args = 0..)]
    pub exclude: Vec<String>,

    /// Estimator for the center line: mean, median, min, max, sum
    #[arg(long, default_value = "mean")]
    pub est: String,

    /// Do not try to open the saved figure
    #[arg(long)]
    pub no_show: bool,
}

impl From<Args> for PlotConfig {
    fn from(args: Args) -> Self {
        Self::builder(args.logdir)
            .legend(args.legend)
            .xaxis(args.xaxis)
            .values(args.values)
            .count(args.count)
            .smooth(args.smooth)
            .linewidth(args.linewidth)
            .select(args.select)
            .exclude(args.exclude)
            .estimator(args.est)
            .show(!args.no_show)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_config() {
        let args = Args::try_parse_from(["trueno-curves"]).unwrap();
        let config = PlotConfig::from(args);
        assert_eq!(config, PlotConfig::default());
    }

    #[test]
    fn test_full_command_line() {
        let args = Args::try_parse_from([
            "trueno-curves",
            "data/ppo_",
            "data/sac_",
            "-l",
            "PPO",
            "SAC",
            "-x",
            "Epoch",
            "-y",
            "Performance",
            "LossPi",
            "--count",
            "-s",
            "5",
            "--lw",
            "2",
            "--select",
            "seed0",
            "--exclude",
            "old",
            "--est",
            "max",
            "--no-show",
        ])
        .unwrap();

        let config = PlotConfig::from(args);
        assert_eq!(config.logdirs, vec!["data/ppo_", "data/sac_"]);
        assert_eq!(config.legend, vec!["PPO", "SAC"]);
        assert_eq!(config.xaxis, "Epoch");
        assert_eq!(config.values, vec!["Performance", "LossPi"]);
        assert!(config.count);
        assert_eq!(config.smooth, 5);
        assert!((config.linewidth - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.select, vec!["seed0"]);
        assert_eq!(config.exclude, vec!["old"]);
        assert_eq!(config.estimator, "max");
        assert!(!config.show);
    }

    #[test]
    fn test_invalid_smooth_rejected() {
        assert!(Args::try_parse_from(["trueno-curves", "-s", "wide"]).is_err());
    }
}
