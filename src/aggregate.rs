//! Seed aggregation into plottable curves
//!
//! All runs are concatenated into one table of `(x, value, unit,
//! condition)` rows and grouped by condition. Rows of one unit that share
//! an x are averaged first; the unit means are then reduced at every
//! distinct x:
//!
//! ```text
//! condition ─┬─ x=4000 ─ [mean(unit0), mean(unit1), mean(unit2)] ─→ (estimator, sd)
//!            ├─ x=8000 ─ [...]
//!            └─ ...
//! ```
//!
//! The estimator gives the line, the population standard deviation the
//! shaded band. Min/max use trueno SIMD kernels when that loses no
//! precision.

use crate::storage::{to_f64_vec, RunDataset, UNIT_COLUMN};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;
use trueno::Vector;

/// Reducer applied across units at each x value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Median (mean of the two middle values for even counts)
    Median,
    /// Minimum
    Min,
    /// Maximum
    Max,
    /// Sum
    Sum,
}

impl Estimator {
    /// Name → reducer table. Aliases follow the numpy reducer names.
    pub const NAMES: [(&'static str, Self); 7] = [
        ("mean", Self::Mean),
        ("median", Self::Median),
        ("min", Self::Min),
        ("amin", Self::Min),
        ("max", Self::Max),
        ("amax", Self::Max),
        ("sum", Self::Sum),
    ];

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
        }
    }

    /// Reduce a sample in f64. Returns NaN for an empty slice.
    ///
    /// Min and max go through trueno SIMD when every sample is exactly
    /// representable as f32; otherwise all reducers stay in f64.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduce(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        match self {
            Self::Median => median(values),
            Self::Sum => compensated_sum(values),
            Self::Mean => compensated_sum(values) / values.len() as f64,
            Self::Min => exact_f32(values)
                .and_then(|data| Vector::from_slice(&data).min().ok())
                .map_or_else(|| values.iter().copied().fold(f64::INFINITY, f64::min), f64::from),
            Self::Max => exact_f32(values)
                .and_then(|data| Vector::from_slice(&data).max().ok())
                .map_or_else(|| values.iter().copied().fold(f64::NEG_INFINITY, f64::max), f64::from),
        }
    }
}

/// Narrow to f32 only if no sample changes value.
#[allow(clippy::cast_possible_truncation)]
fn exact_f32(values: &[f64]) -> Option<Vec<f32>> {
    values
        .iter()
        .map(|&v| {
            let narrowed = v as f32;
            (!v.is_nan() && f64::from(narrowed).to_bits() == v.to_bits()).then_some(narrowed)
        })
        .collect()
}

/// Kahan summation in f64.
fn compensated_sum(values: &[f64]) -> f64 {
    // Compensation turns inf - inf into NaN
    if values.iter().any(|v| v.is_infinite()) {
        return values.iter().sum();
    }
    let mut sum = 0.0;
    let mut carry = 0.0;
    for &value in values {
        let y = value - carry;
        let t = sum + y;
        carry = (t - sum) - y;
        sum = t;
    }
    sum
}

impl FromStr for Estimator {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, estimator)| *estimator)
            .ok_or_else(|| Error::UnknownEstimator(name.to_string()))
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation (ddof = 0).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}

/// One aggregated point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// X-axis value
    pub x: f64,
    /// Estimator across units
    pub center: f64,
    /// Standard deviation across units
    pub sd: f64,
    /// Number of units reduced
    pub count: usize,
}

impl CurvePoint {
    /// Lower edge of the sd band.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.center - self.sd
    }

    /// Upper edge of the sd band.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.center + self.sd
    }
}

/// Aggregated curve of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Group label (legend entry)
    pub label: String,
    /// Points sorted by x
    pub points: Vec<CurvePoint>,
}

impl Curve {
    /// Largest x value, if the curve has points.
    #[must_use]
    pub fn max_x(&self) -> Option<f64> {
        self.points.last().map(|p| p.x)
    }
}

/// Which columns to aggregate.
#[derive(Debug, Clone, Copy)]
pub struct CurveSpec<'a> {
    /// X-axis column
    pub xaxis: &'a str,
    /// Value column
    pub value: &'a str,
    /// Grouping column (`Condition1` or `Condition2`)
    pub condition: &'a str,
    /// Line estimator
    pub estimator: Estimator,
}

/// Concatenate runs and reduce them into one curve per group.
///
/// Runs missing any of the plotted columns are logged and skipped. Rows
/// with a null or NaN x or value are ignored. A unit that logs the same
/// x more than once contributes the mean of those rows. Curves are sorted by
/// label, which fixes legend order and color assignment.
///
/// # Errors
///
/// Returns error if the projected tables cannot be concatenated.
///
/// # Example
///
/// ```rust,no_run
/// use trueno_curves::aggregate::{aggregate_curves, CurveSpec, Estimator};
/// use trueno_curves::storage::DatasetLoader;
///
/// # fn main() -> trueno_curves::Result<()> {
/// let datasets = DatasetLoader::new().load("data/ppo/", None);
/// let curves = aggregate_curves(
///     &datasets,
///     &CurveSpec {
///         xaxis: "TotalEnvInteracts",
///         value: "Performance",
///         condition: "Condition1",
///         estimator: Estimator::Mean,
///     },
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn aggregate_curves(datasets: &[RunDataset], spec: &CurveSpec<'_>) -> Result<Vec<Curve>> {
    let schema: SchemaRef = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, true),
        Field::new("value", DataType::Float64, true),
        Field::new("unit", DataType::Int64, false),
        Field::new("condition", DataType::Utf8, false),
    ]));

    let mut projected = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        match project(dataset, spec, &schema) {
            Ok(batch) => projected.push(batch),
            Err(e) => warn!(
                run = %dataset.root().display(),
                error = %e,
                "run lacks a plotted column, skipping"
            ),
        }
    }

    let combined = compute::concat_batches(&schema, &projected)?;
    Ok(reduce_groups(&combined, spec.estimator))
}

fn project(dataset: &RunDataset, spec: &CurveSpec<'_>, schema: &SchemaRef) -> Result<RecordBatch> {
    let x = dataset.float_column(spec.xaxis)?;
    let value = dataset.float_column(spec.value)?;

    let unit = tagged_column(dataset.batch(), UNIT_COLUMN, &DataType::Int64)?;
    let condition = tagged_column(dataset.batch(), spec.condition, &DataType::Utf8)?;

    Ok(RecordBatch::try_new(
        Arc::clone(schema),
        vec![Arc::new(x), Arc::new(value), unit, condition],
    )?)
}

fn tagged_column(batch: &RecordBatch, name: &str, data_type: &DataType) -> Result<ArrayRef> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| Error::ColumnNotFound(name.to_string()))?;
    Ok(compute::cast(batch.column(index), data_type)?)
}

/// Running `(sum, rows)` per unit at one x.
#[derive(Default)]
struct Bucket {
    x: f64,
    units: FxHashMap<i64, (f64, usize)>,
}

impl Bucket {
    #[allow(clippy::cast_precision_loss)]
    fn unit_means(&self) -> Vec<f64> {
        let mut units: Vec<_> = self.units.iter().collect();
        units.sort_unstable_by_key(|(unit, _)| **unit);
        units
            .into_iter()
            .map(|(_, &(sum, rows))| sum / rows as f64)
            .collect()
    }
}

fn reduce_groups(combined: &RecordBatch, estimator: Estimator) -> Vec<Curve> {
    let columns = (
        combined.column(0).as_any().downcast_ref::<Float64Array>(),
        combined.column(1).as_any().downcast_ref::<Float64Array>(),
        combined.column(2).as_any().downcast_ref::<Int64Array>(),
        combined.column(3).as_any().downcast_ref::<StringArray>(),
    );
    let (Some(xs), Some(values), Some(units), Some(labels)) = columns else {
        return Vec::new();
    };

    let x_vals = to_f64_vec(xs);
    let y_vals = to_f64_vec(values);

    let mut groups: FxHashMap<&str, FxHashMap<u64, Bucket>> = FxHashMap::default();
    for (row, (&x, &y)) in x_vals.iter().zip(&y_vals).enumerate() {
        if x.is_nan() || y.is_nan() || units.is_null(row) || labels.is_null(row) {
            continue;
        }
        // -0.0 and 0.0 share a bucket
        let x = if x == 0.0 { 0.0 } else { x };
        let bucket = groups
            .entry(labels.value(row))
            .or_default()
            .entry(x.to_bits())
            .or_default();
        bucket.x = x;
        let (sum, rows) = bucket.units.entry(units.value(row)).or_default();
        *sum += y;
        *rows += 1;
    }

    let mut curves: Vec<Curve> = groups
        .into_iter()
        .map(|(label, buckets)| {
            let mut points: Vec<CurvePoint> = buckets
                .into_values()
                .map(|bucket| {
                    let samples = bucket.unit_means();
                    CurvePoint {
                        x: bucket.x,
                        center: estimator.reduce(&samples),
                        sd: std_dev(&samples),
                        count: samples.len(),
                    }
                })
                .collect();
            points.sort_by(|a, b| a.x.total_cmp(&b.x));
            Curve {
                label: label.to_string(),
                points,
            }
        })
        .collect();
    curves.sort_by(|a, b| a.label.cmp(&b.label));
    curves
}
