use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::analyzers::utility::mean as mean_of;
use crate::error::{AnalysisError, Result};
use crate::table::{Row, RowView, Table, Value};

/// Which end of a column [`extremum`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extremum {
    Min,
    Max,
}

/// Predicate used by [`filter_by_threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = ">")]
    Above,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "<")]
    Below,
}

impl Comparison {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::AtLeast => lhs >= rhs,
            Comparison::Above => lhs > rhs,
            Comparison::AtMost => lhs <= rhs,
            Comparison::Below => lhs < rhs,
        }
    }
}

/// Occurrences of one token in a multi-valued column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub token: String,
    pub count: usize,
}

/// Non-null cells of a numeric column with their row positions.
pub(crate) fn numeric_cells<'a>(table: &'a Table, column: &str) -> Result<Vec<(usize, &'a Value)>> {
    let mut cells = Vec::new();
    for (pos, (row, value)) in table.column(column)?.enumerate() {
        match value {
            Value::Null => continue,
            Value::Int(_) | Value::Float(_) => cells.push((pos, value)),
            _ => return Err(not_numeric(column, row, value)),
        }
    }
    Ok(cells)
}

pub(crate) fn numeric_values(table: &Table, column: &str) -> Result<Vec<f64>> {
    Ok(numeric_cells(table, column)?
        .into_iter()
        .filter_map(|(_, v)| v.as_f64())
        .collect())
}

fn not_numeric(column: &str, row: &Row, value: &Value) -> AnalysisError {
    AnalysisError::InvalidValue {
        column: column.to_string(),
        row: row.source_row(),
        value: value.to_string(),
        expected: "a number",
    }
}

// Integers compare exactly; anything involving a float goes through f64.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    }
}

/// Returns the row holding the minimum or maximum of a numeric column.
///
/// Nulls are skipped. On ties the first row in table order wins.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] for an unknown column,
/// [`AnalysisError::InvalidValue`] for a non-numeric cell and
/// [`AnalysisError::EmptyResult`] when the column has no non-null values.
pub fn extremum<'a>(table: &'a Table, column: &str, kind: Extremum) -> Result<RowView<'a>> {
    let mut best: Option<(usize, &Value)> = None;

    for (pos, value) in numeric_cells(table, column)? {
        let better = match best {
            None => true,
            Some((_, current)) => match kind {
                Extremum::Min => compare(value, current) == Ordering::Less,
                Extremum::Max => compare(value, current) == Ordering::Greater,
            },
        };
        if better {
            best = Some((pos, value));
        }
    }

    best.and_then(|(pos, _)| table.row(pos))
        .ok_or_else(|| AnalysisError::empty_result(column))
}

/// Arithmetic mean of a numeric column, ignoring nulls.
///
/// # Errors
///
/// Same as [`extremum`].
pub fn mean(table: &Table, column: &str) -> Result<f64> {
    let values = numeric_values(table, column)?;
    mean_of(&values).ok_or_else(|| AnalysisError::empty_result(column))
}

/// Rows whose `column` value satisfies `op` against `value`, in table order.
///
/// Null cells never match. The returned table is indexed from zero.
pub fn filter_by_threshold(table: &Table, column: &str, op: Comparison, value: f64) -> Result<Table> {
    let matching: Vec<usize> = numeric_cells(table, column)?
        .into_iter()
        .filter(|(_, v)| v.as_f64().is_some_and(|x| op.holds(x, value)))
        .map(|(pos, _)| pos)
        .collect();

    let rows = matching
        .into_iter()
        .map(|pos| table.rows()[pos].clone())
        .collect();

    Ok(Table::new(table.columns().to_vec(), rows))
}

/// Counts the tokens of a `separator`-delimited column across all rows.
///
/// Null cells and empty tokens are skipped. Entries are sorted by descending
/// count; equal counts keep the order in which the tokens were first seen.
pub fn frequency_count(table: &Table, column: &str, separator: char) -> Result<Vec<TokenCount>> {
    let mut counts: Vec<TokenCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (_, cell) in table.column(column)? {
        if cell.is_null() {
            continue;
        }
        let text = cell.to_string();
        for token in text.split(separator).filter(|t| !t.is_empty()) {
            match index.get(token) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(token.to_string(), counts.len());
                    counts.push(TokenCount {
                        token: token.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Table {
        Table::from_rows(
            &["original_title", "budget", "runtime", "profit", "genres"],
            vec![
                vec!["A".into(), Value::Int(10), Value::Int(90), Value::Int(5), "Action|Drama".into()],
                vec!["B".into(), Value::Int(30), Value::Null, Value::Int(-5), "Drama|Comedy".into()],
                vec!["C".into(), Value::Int(30), Value::Int(120), Value::Int(30_000_000), Value::Null],
                vec!["D".into(), Value::Int(5), Value::Float(100.5), Value::Int(25_000_000), "Comedy".into()],
            ],
        )
        .unwrap()
    }

    fn title<'a>(row: &RowView<'a>) -> &'a str {
        row.get("original_title").and_then(Value::as_str).unwrap()
    }

    #[test]
    fn test_extremum_max_first_tie_wins() {
        let table = movies();
        let row = extremum(&table, "budget", Extremum::Max).unwrap();
        assert_eq!(title(&row), "B");
    }

    #[test]
    fn test_extremum_max_is_upper_bound() {
        let table = movies();
        let row = extremum(&table, "budget", Extremum::Max).unwrap();
        let best = row.get("budget").and_then(Value::as_i64).unwrap();
        for (_, v) in table.column("budget").unwrap() {
            assert!(best >= v.as_i64().unwrap());
        }
    }

    #[test]
    fn test_extremum_min_skips_nulls() {
        let table = movies();
        let row = extremum(&table, "runtime", Extremum::Min).unwrap();
        assert_eq!(title(&row), "A");

        let row = extremum(&table, "runtime", Extremum::Max).unwrap();
        assert_eq!(title(&row), "C");
    }

    #[test]
    fn test_extremum_empty_column() {
        let table = Table::from_rows(&["runtime"], vec![vec![Value::Null]]).unwrap();
        let err = extremum(&table, "runtime", Extremum::Max).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResult { .. }));
    }

    #[test]
    fn test_extremum_non_numeric_column() {
        let table = movies();
        let err = extremum(&table, "original_title", Extremum::Min).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn test_mean_excludes_nulls() {
        let table = movies();
        let m = mean(&table, "runtime").unwrap();
        assert!((m - (90.0 + 120.0 + 100.5) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_unknown_column() {
        let table = movies();
        assert!(matches!(
            mean(&table, "revenue"),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_mean_empty_is_error_not_zero() {
        let table = Table::from_rows(&["runtime"], vec![]).unwrap();
        assert!(matches!(
            mean(&table, "runtime"),
            Err(AnalysisError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_filter_by_threshold() {
        let table = movies();
        let profitable =
            filter_by_threshold(&table, "profit", Comparison::AtLeast, 25_000_000.0).unwrap();

        assert_eq!(profitable.len(), 2);
        assert_eq!(title(&profitable.row(0).unwrap()), "C");
        assert_eq!(title(&profitable.row(1).unwrap()), "D");
        assert_eq!(profitable.columns(), table.columns());

        let strict = filter_by_threshold(&table, "profit", Comparison::Above, 25_000_000.0).unwrap();
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn test_filter_by_threshold_skips_nulls() {
        let table = movies();
        let short = filter_by_threshold(&table, "runtime", Comparison::Below, 1000.0).unwrap();
        assert_eq!(short.len(), 3);
    }

    #[test]
    fn test_frequency_count_genres() {
        let table = Table::from_rows(
            &["genres"],
            vec![vec!["Action|Drama".into()], vec!["Drama|Comedy".into()]],
        )
        .unwrap();

        let counts = frequency_count(&table, "genres", '|').unwrap();

        let expected: Vec<(&str, usize)> = vec![("Drama", 2), ("Action", 1), ("Comedy", 1)];
        let actual: Vec<(&str, usize)> = counts.iter().map(|c| (c.token.as_str(), c.count)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_frequency_count_totals_match_tokens() {
        let table = movies();
        let counts = frequency_count(&table, "genres", '|').unwrap();

        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_frequency_count_skips_empty_tokens() {
        let table = Table::from_rows(&["cast"], vec![vec!["Tom Hanks||".into()]]).unwrap();
        let counts = frequency_count(&table, "cast", '|').unwrap();
        assert_eq!(
            counts,
            vec![TokenCount {
                token: "Tom Hanks".into(),
                count: 1
            }]
        );
    }
}
