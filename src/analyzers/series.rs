//! Numeric series handed to an external plotting tool.

use serde::Serialize;

use crate::analyzers::aggregate::numeric_values;
use crate::error::{AnalysisError, Result};
use crate::table::Table;

/// One equal-width histogram bin, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Splits the non-null values of `column` into `bins` equal-width bins spanning min to max.
///
/// A column whose values are all equal gets the range `value ± 0.5`.
///
/// # Errors
///
/// [`AnalysisError::EmptyResult`] when the column has no non-null values.
pub fn histogram(table: &Table, column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
    let values = numeric_values(table, column)?;
    if values.is_empty() {
        return Err(AnalysisError::empty_result(column));
    }
    let bins = bins.max(1);

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let slot = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[slot] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect())
}

/// Pairs of `(x, y)` for rows where both columns are non-null.
pub fn scatter(table: &Table, x: &str, y: &str) -> Result<Vec<ScatterPoint>> {
    // validates both columns are numeric
    numeric_values(table, x)?;
    numeric_values(table, y)?;
    let xi = table.column_index(x)?;
    let yi = table.column_index(y)?;

    Ok(table
        .rows()
        .iter()
        .filter_map(|row| {
            Some(ScatterPoint {
                x: row.values()[xi].as_f64()?,
                y: row.values()[yi].as_f64()?,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn runtimes(values: Vec<Value>) -> Table {
        Table::from_rows(
            &["runtime", "profit"],
            values.into_iter().map(|v| vec![v, Value::Int(1)]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let table = runtimes(vec![
            Value::Int(80),
            Value::Int(90),
            Value::Null,
            Value::Int(100),
            Value::Int(120),
        ]);

        let bins = histogram(&table, "runtime", 4).unwrap();

        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].lower, 80.0);
        assert_eq!(bins[3].upper, 120.0);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_histogram_single_value() {
        let table = runtimes(vec![Value::Int(90), Value::Int(90)]);
        let bins = histogram(&table, "runtime", 2).unwrap();
        assert_eq!(bins[0].lower, 89.5);
        assert_eq!(bins[1].upper, 90.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_empty() {
        let table = runtimes(vec![Value::Null]);
        assert!(matches!(
            histogram(&table, "runtime", 50),
            Err(AnalysisError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_scatter_skips_nulls() {
        let table = runtimes(vec![Value::Int(80), Value::Null]);
        let points = scatter(&table, "runtime", "profit").unwrap();
        assert_eq!(points, vec![ScatterPoint { x: 80.0, y: 1.0 }]);
    }
}
