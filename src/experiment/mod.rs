//! Run discovery and identity
//!
//! ## Layout On Disk
//!
//! ```text
//! logdir/
//! ├── ppo_s0/
//! │   ├── config.json    {"exp_name": "ppo", ...}
//! │   └── progress.txt   tab-delimited, header row
//! └── ppo_s1/
//!     ├── config.json
//!     └── progress.txt
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trueno_curves::experiment::{LabelRegistry, RunRecord};
//!
//! // A discovered run
//! let run = RunRecord::new("data/ppo_s0", Some("ppo".to_string()));
//!
//! // Assign its unit and secondary label
//! let mut registry = LabelRegistry::new();
//! let identity = registry.assign(run.exp_name().unwrap_or("exp"));
//! assert_eq!(identity.unit, 0);
//! assert_eq!(identity.condition2, "ppo-0");
//! ```

mod locator;
mod metadata;
mod registry;
mod run_record;

pub use locator::locate_runs;
pub use metadata::RunMetadata;
pub use registry::{LabelRegistry, RunIdentity};
pub use run_record::RunRecord;

/// Results table written by the training logger.
pub const RESULTS_FILE: &str = "progress.txt";

/// Run configuration written next to the results table.
pub const METADATA_FILE: &str = "config.json";

/// Metadata key holding the experiment name.
pub const EXP_NAME_KEY: &str = "exp_name";

/// Label used when neither an override nor an experiment name exists.
pub const DEFAULT_CONDITION: &str = "exp";
