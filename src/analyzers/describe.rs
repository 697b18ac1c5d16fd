use serde::Serialize;

use crate::analyzers::utility::{mean, stddev};
use crate::table::{Table, Value};

/// Summary statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarizes every column whose non-null cells are all numbers.
///
/// Columns holding text or dates, and columns with no non-null cells, are
/// left out. The standard deviation is the population one.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let mut values = Vec::new();
            for row in table.rows() {
                match &row.values()[idx] {
                    Value::Null => {}
                    cell => values.push(cell.as_f64()?),
                }
            }

            let m = mean(&values)?;
            Some(ColumnSummary {
                column: name.clone(),
                count: values.len(),
                mean: m,
                std: stddev(&values, m)?,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}
