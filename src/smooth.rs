//! Moving-average smoothing
//!
//! ```text
//! smoothed[t] = mean(y[t-k], ..., y[t+k])      window = 2k + 1
//! ```
//!
//! Computed as a normalized convolution: the series convolved with a
//! ones-kernel, divided by a ones-series convolved with the same kernel.
//! Near the edges the divisor shrinks with the truncated window, so edge
//! samples average over what is actually available. Even windows follow
//! the same alignment as a `same`-mode convolution (one extra sample on
//! the leading side).

use crate::storage::{float_column, to_f64_vec};
use crate::{Error, Result};
use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use std::sync::Arc;

/// Centered moving average over `window` samples.
///
/// Output has the same length as the input. NaN samples are treated as
/// missing: they add to neither the sum nor the count. A window of 0 or
/// 1 returns the input unchanged.
///
/// # Example
///
/// ```rust
/// use trueno_curves::smooth::moving_average;
///
/// let smoothed = moving_average(&[0.0, 3.0, 6.0, 9.0], 3);
/// assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 7.5]);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }

    let n = values.len();
    let offset = (window - 1) / 2;
    (0..n)
        .map(|i| {
            let hi = (i + offset).min(n - 1);
            let lo = (i + offset + 1).saturating_sub(window);
            let (sum, count) = values[lo..=hi]
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect()
}

/// Replace `column` with its moving average.
///
/// The smoothed column is stored as nullable `Float64`; windows with no
/// valid sample become null. Window 0 or 1 returns the batch unchanged.
///
/// # Errors
///
/// Returns `Error::ColumnNotFound` if the column does not exist.
pub fn smooth_column(batch: &RecordBatch, column: &str, window: usize) -> Result<RecordBatch> {
    if window <= 1 {
        return Ok(batch.clone());
    }

    let schema = batch.schema();
    let index = schema
        .index_of(column)
        .map_err(|_| Error::ColumnNotFound(column.to_string()))?;

    let raw = to_f64_vec(&float_column(batch, column)?);
    let smoothed: Float64Array = moving_average(&raw, window)
        .into_iter()
        .map(|v| if v.is_nan() { None } else { Some(v) })
        .collect();

    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    fields[index] = Arc::new(Field::new(column, DataType::Float64, true));
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    columns[index] = Arc::new(smoothed);

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array};

    #[test]
    fn test_window_one_is_identity() {
        let values = vec![1.0, 5.0, -2.0];
        assert_eq!(moving_average(&values, 1), values);
        assert_eq!(moving_average(&values, 0), values);
    }

    #[test]
    fn test_odd_window_truncates_at_edges() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let smoothed = moving_average(&values, 3);
        assert_eq!(smoothed, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
    }

    #[test]
    fn test_even_window_alignment() {
        // ones(5) * ones(2) in `same` mode covers [i-1, i]
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let smoothed = moving_average(&values, 2);
        assert_eq!(smoothed, vec![1.0, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_window_wider_than_series() {
        let values = vec![2.0, 4.0];
        let smoothed = moving_average(&values, 9);
        assert_eq!(smoothed, vec![3.0, 3.0]);
    }

    #[test]
    fn test_nan_is_skipped() {
        let values = vec![1.0, f64::NAN, 3.0];
        let smoothed = moving_average(&values, 3);
        assert_eq!(smoothed, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_smooth_column_replaces_with_float() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Epoch", DataType::Int64, false),
            Field::new("AverageEpRet", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![0, 1, 2])),
                Arc::new(Int64Array::from(vec![0, 3, 6])),
            ],
        )
        .unwrap();

        let smoothed = smooth_column(&batch, "AverageEpRet", 3).unwrap();
        assert_eq!(smoothed.num_rows(), 3);
        assert_eq!(smoothed.schema().field(1).data_type(), &DataType::Float64);

        let values = smoothed
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(values.len(), 3);
        assert!((values.value(0) - 1.5).abs() < 1e-12);
        assert!((values.value(1) - 3.0).abs() < 1e-12);
        assert!((values.value(2) - 4.5).abs() < 1e-12);

        // Untouched column keeps its type
        assert_eq!(smoothed.schema().field(0).data_type(), &DataType::Int64);
    }

    #[test]
    fn test_smooth_column_missing() {
        let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1]))]).unwrap();
        assert!(matches!(
            smooth_column(&batch, "y", 5),
            Err(Error::ColumnNotFound(_))
        ));
    }
}
