//! Dataset loading (Arrow)
//!
//! Each run's `progress.txt` is read into an Arrow [`RecordBatch`] and
//! tagged with the run's identity:
//!
//! | Column       | Type    | Meaning                                   |
//! |--------------|---------|-------------------------------------------|
//! | `Unit`       | Int64   | per-label seed index                      |
//! | `Condition1` | Utf8    | experiment label                          |
//! | `Condition2` | Utf8    | label plus global run index               |
//! | `Performance`| (copied)| first present column of [`PerformanceMetric::PRIORITY`] |
//!
//! Runs that cannot be read, or that carry no performance column, are
//! logged and skipped.

mod performance;

pub use performance::PerformanceMetric;

use crate::experiment::{locate_runs, LabelRegistry, RunIdentity, RunRecord, DEFAULT_CONDITION};
use crate::resolve::check_legend;
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::compute;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Per-label seed index column
pub const UNIT_COLUMN: &str = "Unit";

/// Primary label column
pub const CONDITION1_COLUMN: &str = "Condition1";

/// Secondary (per-run) label column
pub const CONDITION2_COLUMN: &str = "Condition2";

/// Synthetic performance column
pub const PERFORMANCE_COLUMN: &str = "Performance";

const SYNTHETIC_COLUMNS: [&str; 4] = [
    UNIT_COLUMN,
    CONDITION1_COLUMN,
    CONDITION2_COLUMN,
    PERFORMANCE_COLUMN,
];

const DELIMITER: u8 = b'\t';

/// One loaded and tagged run.
#[derive(Debug, Clone)]
pub struct RunDataset {
    root: PathBuf,
    identity: RunIdentity,
    performance: PerformanceMetric,
    batch: RecordBatch,
}

impl RunDataset {
    /// Run directory the table was read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Primary label.
    #[must_use]
    pub fn condition1(&self) -> &str {
        &self.identity.condition1
    }

    /// Secondary label.
    #[must_use]
    pub fn condition2(&self) -> &str {
        &self.identity.condition2
    }

    /// Per-label unit index.
    #[must_use]
    pub const fn unit(&self) -> usize {
        self.identity.unit
    }

    /// Source column copied into `Performance`.
    #[must_use]
    pub const fn performance(&self) -> PerformanceMetric {
        self.performance
    }

    /// Tagged table.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Check whether the table has a column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    /// Column values cast to `Float64` (unparsable entries become null).
    ///
    /// # Errors
    ///
    /// Returns `Error::ColumnNotFound` if the column does not exist.
    pub fn float_column(&self, name: &str) -> Result<Float64Array> {
        float_column(&self.batch, name)
    }

    /// Replace the table, keeping the run's identity.
    #[must_use]
    pub fn with_batch(self, batch: RecordBatch) -> Self {
        Self { batch, ..self }
    }
}

/// Loads runs and assigns their identities.
///
/// The loader owns its [`LabelRegistry`]: repeated calls to
/// [`load`](Self::load) on one loader keep counting units, a new loader
/// starts again from zero.
///
/// # Example
///
/// ```rust,no_run
/// use trueno_curves::storage::DatasetLoader;
///
/// let mut loader = DatasetLoader::new();
/// let datasets = loader.load("data/ppo_cartpole/", None);
/// for run in &datasets {
///     println!("{} unit {}: {} rows", run.condition1(), run.unit(), run.num_rows());
/// }
/// ```
#[derive(Debug, Default)]
pub struct DatasetLoader {
    registry: LabelRegistry,
}

impl DatasetLoader {
    /// Create a loader with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry state after the loads performed so far.
    #[must_use]
    pub const fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    /// Locate and load every run under `logdir`.
    ///
    /// `condition` overrides the discovered experiment names. Runs are
    /// returned in label-sorted order; unreadable runs are skipped.
    pub fn load<P: AsRef<Path>>(&mut self, logdir: P, condition: Option<&str>) -> Vec<RunDataset> {
        locate_runs(logdir)
            .iter()
            .filter_map(|run| self.load_run(run, condition))
            .collect()
    }

    /// Load one located run.
    ///
    /// Assigns the run's identity first, so the counters advance even
    /// when the results file turns out to be unreadable.
    pub fn load_run(&mut self, run: &RunRecord, condition: Option<&str>) -> Option<RunDataset> {
        let label = condition.or_else(|| run.exp_name()).unwrap_or(DEFAULT_CONDITION);
        let identity = self.registry.assign(label);
        let path = run.results_path();

        let table = match read_progress_table(&path) {
            Ok(table) => table,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read results, skipping run");
                return None;
            }
        };
        info!(lines = table.num_rows(), path = %path.display(), "read results");

        let Some(performance) = PerformanceMetric::select(&table.schema()) else {
            warn!(
                path = %path.display(),
                candidates = ?PerformanceMetric::PRIORITY.map(PerformanceMetric::column_name),
                "no performance column, skipping run"
            );
            return None;
        };

        match tag_table(&table, &identity, performance) {
            Ok(batch) => Some(RunDataset {
                root: run.root().to_path_buf(),
                identity,
                performance,
                batch,
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not tag results, skipping run");
                None
            }
        }
    }

    /// Load every directory, pairing each with its legend entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::LegendMismatch` before reading anything if a
    /// non-empty legend does not have one entry per directory.
    pub fn load_all<P: AsRef<Path>>(
        &mut self,
        logdirs: &[P],
        legend: Option<&[String]>,
    ) -> Result<Vec<RunDataset>> {
        check_legend(legend, logdirs.len())?;

        let mut datasets = Vec::new();
        match legend.filter(|l| !l.is_empty()) {
            Some(legend) => {
                for (logdir, label) in logdirs.iter().zip(legend) {
                    datasets.extend(self.load(logdir, Some(label.as_str())));
                }
            }
            None => {
                for logdir in logdirs {
                    datasets.extend(self.load(logdir, None));
                }
            }
        }
        Ok(datasets)
    }
}

/// Read a tab-delimited results table with a header row.
///
/// Column types are inferred from the data (integers, floats, booleans,
/// otherwise strings).
///
/// # Errors
///
/// Returns error if the file cannot be opened, has no columns, or has
/// rows that do not match the header.
pub fn read_progress_table<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| Error::StorageError(format!("Failed to open {}: {e}", path.display())))?;

    let format = Format::default()
        .with_header(true)
        .with_delimiter(DELIMITER);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    if schema.fields().is_empty() {
        return Err(Error::StorageError(format!(
            "No columns in {}",
            path.display()
        )));
    }
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .with_delimiter(DELIMITER)
        .build(file)?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }

    compute::concat_batches(&schema, &batches)
        .map_err(|e| Error::StorageError(format!("Failed to combine batches: {e}")))
}

/// Append the identity and `Performance` columns to a results table.
///
/// Columns of the source table that already use a synthetic name are
/// replaced.
///
/// # Errors
///
/// Returns error if the performance column is missing from the table.
#[allow(clippy::cast_possible_wrap)]
pub fn tag_table(
    table: &RecordBatch,
    identity: &RunIdentity,
    performance: PerformanceMetric,
) -> Result<RecordBatch> {
    let schema = table.schema();
    let perf_index = schema
        .index_of(performance.column_name())
        .map_err(|_| Error::ColumnNotFound(performance.column_name().to_string()))?;
    let perf_field = schema.field(perf_index);
    let perf_column = Arc::clone(table.column(perf_index));

    let mut fields: Vec<FieldRef> = Vec::with_capacity(schema.fields().len() + 4);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 4);
    for (field, column) in schema.fields().iter().zip(table.columns()) {
        if SYNTHETIC_COLUMNS.contains(&field.name().as_str()) {
            continue;
        }
        fields.push(Arc::clone(field));
        columns.push(Arc::clone(column));
    }

    let rows = table.num_rows();
    fields.push(Arc::new(Field::new(UNIT_COLUMN, DataType::Int64, false)));
    columns.push(Arc::new(Int64Array::from(vec![identity.unit as i64; rows])));

    fields.push(Arc::new(Field::new(CONDITION1_COLUMN, DataType::Utf8, false)));
    columns.push(Arc::new(StringArray::from(vec![
        identity.condition1.as_str();
        rows
    ])));

    fields.push(Arc::new(Field::new(CONDITION2_COLUMN, DataType::Utf8, false)));
    columns.push(Arc::new(StringArray::from(vec![
        identity.condition2.as_str();
        rows
    ])));

    fields.push(Arc::new(Field::new(
        PERFORMANCE_COLUMN,
        perf_field.data_type().clone(),
        true,
    )));
    columns.push(perf_column);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Cast a column to `Float64`.
///
/// Values that cannot be represented (e.g. unparsable strings) become
/// null.
///
/// # Errors
///
/// Returns `Error::ColumnNotFound` if the column does not exist.
pub fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let index = batch
        .schema()
        .index_of(name)
        .map_err(|_| Error::ColumnNotFound(name.to_string()))?;
    let cast = compute::cast(batch.column(index), &DataType::Float64)?;
    cast.as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| Error::Other("Failed to downcast to Float64Array".to_string()))
}

/// Column values as `f64`, with nulls mapped to NaN.
#[must_use]
pub fn to_f64_vec(array: &Float64Array) -> Vec<f64> {
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                f64::NAN
            } else {
                array.value(i)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn identity(label: &str, unit: usize) -> RunIdentity {
        RunIdentity {
            condition1: label.to_string(),
            condition2: format!("{label}-{unit}"),
            unit,
        }
    }

    #[test]
    fn test_read_progress_table_infers_types() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("progress.txt");
        fs::write(
            &path,
            "Epoch\tAverageEpRet\tTotalEnvInteracts\n0\t-1.5\t4000\n1\t2.25\t8000\n",
        )
        .unwrap();

        let table = read_progress_table(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 3);

        let ret = to_f64_vec(&float_column(&table, "AverageEpRet").unwrap());
        assert_eq!(ret, vec![-1.5, 2.25]);
    }

    #[test]
    fn test_read_progress_table_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_progress_table(tmp.path().join("progress.txt")).unwrap_err();
        assert!(matches!(err, Error::StorageError(_)));
    }

    #[test]
    fn test_tag_table_appends_columns_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("progress.txt");
        fs::write(&path, "Epoch\tAverageEpRet\n0\t1.0\n1\t3.0\n").unwrap();
        let table = read_progress_table(&path).unwrap();

        let tagged = tag_table(&table, &identity("ppo", 2), PerformanceMetric::AverageEpRet).unwrap();
        let schema = tagged.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec!["Epoch", "AverageEpRet", "Unit", "Condition1", "Condition2", "Performance"]
        );

        let unit = tagged
            .column(2)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(unit.values().to_vec(), vec![2, 2]);

        let label = tagged
            .column(4)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(label.value(0), "ppo-2");
    }

    #[test]
    fn test_tag_table_replaces_existing_synthetic_column() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("progress.txt");
        fs::write(&path, "Unit\tAverageEpRet\n9\t1.0\n").unwrap();
        let table = read_progress_table(&path).unwrap();

        let tagged = tag_table(&table, &identity("ppo", 0), PerformanceMetric::AverageEpRet).unwrap();
        assert_eq!(tagged.num_columns(), 5);
        let unit = to_f64_vec(&float_column(&tagged, UNIT_COLUMN).unwrap());
        assert_eq!(unit, vec![0.0]);
    }

    #[test]
    fn test_float_column_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("progress.txt");
        fs::write(&path, "Epoch\n0\n").unwrap();
        let table = read_progress_table(&path).unwrap();

        assert!(matches!(
            float_column(&table, "Nope"),
            Err(Error::ColumnNotFound(name)) if name == "Nope"
        ));
    }
}
