//! # Trueno-Curves: Learning-Curve Plots for RL Experiment Logs
//!
//! **Version**: 0.1.0
//!
//! Trueno-Curves discovers training runs on disk, loads their tabular
//! progress logs into Arrow tables, aggregates seeds into mean ± sd
//! curves, and renders comparison plots.
//!
//! ## Pipeline
//!
//! ```text
//! prefixes ─→ resolve ─→ locate runs ─→ load + tag ─→ smooth ─→ aggregate ─→ PNG
//!                        (config.json)   (progress.txt,  (moving   (estimator
//!                                         Unit/Condition) average)  ± sd)
//! ```
//!
//! ## Design Principles
//!
//! - **Per-run isolation**: a malformed run is logged and skipped, never fatal
//! - **Fail fast on user errors**: legend and estimator checks precede any I/O
//! - **No global state**: unit counters live in one [`storage::DatasetLoader`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trueno_curves::aggregate::{aggregate_curves, CurveSpec, Estimator};
//! use trueno_curves::storage::DatasetLoader;
//!
//! let mut loader = DatasetLoader::new();
//! let runs = loader.load("data/ppo_cartpole/", None);
//! let curves = aggregate_curves(
//!     &runs,
//!     &CurveSpec {
//!         xaxis: "TotalEnvInteracts",
//!         value: "Performance",
//!         condition: "Condition1",
//!         estimator: Estimator::Mean,
//!     },
//! )?;
//! for curve in &curves {
//!     println!("{}: {} points", curve.label, curve.points.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod experiment;
pub mod pipeline;
pub mod plot;
pub mod resolve;
pub mod smooth;
pub mod storage;

pub use error::{Error, Result};
