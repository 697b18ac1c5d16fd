//! Ordered cleaning pipeline for the raw movie table.
//!
//! [`clean`] runs the steps in a fixed order; later steps rely on earlier
//! ones (profit is only derived once budget and revenue are known to be
//! non-null integers). Each step is also available on its own and takes and
//! returns the table by value.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::CleaningConfig;
use crate::error::{AnalysisError, Result};
use crate::table::{Row, Table, Value};

pub const BUDGET: &str = "budget";
pub const REVENUE: &str = "revenue";
pub const PROFIT: &str = "profit";

/// Row and column counts observed while cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningSummary {
    pub rows_loaded: usize,
    pub columns_dropped: usize,
    pub duplicates_removed: usize,
    pub missing_financials_removed: usize,
    pub zeros_nulled: usize,
    pub rows_remaining: usize,
    pub columns_remaining: usize,
}

/// Runs every cleaning step in order.
///
/// # Errors
///
/// Fails on the first value that cannot be converted; no partially cleaned
/// table is returned.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn clean(table: Table, config: &CleaningConfig) -> Result<(Table, CleaningSummary)> {
    let mut summary = CleaningSummary {
        rows_loaded: table.len(),
        ..Default::default()
    };

    let columns_before = table.columns().len();
    let table = drop_columns(table, &config.dropped_columns);
    summary.columns_dropped = columns_before - table.columns().len();

    let rows_before = table.len();
    let table = drop_duplicates(table);
    summary.duplicates_removed = rows_before - table.len();
    info!(
        removed = summary.duplicates_removed,
        rows = table.len(),
        "Dropped duplicate rows"
    );

    let rows_before = table.len();
    let table = drop_missing(table, &config.required_nonzero)?;
    let table = parse_dates(table, &config.date_column, config.year_column.as_deref())?;
    let table = cast_integer(table, &config.integer_columns)?;
    let table = drop_non_positive(table, &config.required_nonzero)?;
    summary.missing_financials_removed = rows_before - table.len();
    info!(
        removed = summary.missing_financials_removed,
        rows = table.len(),
        "Dropped rows with missing budget or revenue"
    );

    // Distinct raw dates or fractions can coincide once converted.
    let rows_before = table.len();
    let table = drop_duplicates(table);
    let converged = rows_before - table.len();
    if converged > 0 {
        summary.duplicates_removed += converged;
        debug!(removed = converged, "Dropped rows duplicated by conversion");
    }

    let (table, nulled) = null_zeros(table, &config.nullable_zero)?;
    summary.zeros_nulled = nulled;
    debug!(nulled, "Replaced zero values with null");

    let table = derive_profit(table)?;

    summary.rows_remaining = table.len();
    summary.columns_remaining = table.columns().len();
    info!(
        rows = summary.rows_remaining,
        columns = summary.columns_remaining,
        "Cleaning complete"
    );

    Ok((table, summary))
}

/// Removes the named columns. Names not present in the table are skipped.
pub fn drop_columns(table: Table, names: &[String]) -> Table {
    let (columns, rows) = table.into_parts();

    let keep: Vec<bool> = columns.iter().map(|c| !names.contains(c)).collect();
    for name in names {
        if !columns.contains(name) {
            debug!(column = %name, "Column to drop not present");
        }
    }

    let columns = retain_flagged(columns, &keep);
    let rows = rows
        .into_iter()
        .map(|row| Row::new(row.source_row, retain_flagged(row.values, &keep)))
        .collect();

    Table::new(columns, rows)
}

fn comparable(value: &Value) -> Value {
    match value.to_number() {
        Some(Value::Float(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::Int(f as i64)
        }
        Some(number) => number,
        None => value.clone(),
    }
}

fn retain_flagged<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, &k)| k.then_some(item))
        .collect()
}

/// Removes rows identical to an earlier row in every column, keeping the first.
///
/// Numeric text is compared by value, so `10` and `10.0` are the same cell.
pub fn drop_duplicates(table: Table) -> Table {
    let (columns, rows) = table.into_parts();

    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(rows.len());
        rows.iter()
            .map(|r| seen.insert(r.values.iter().map(comparable).collect::<Vec<_>>()))
            .collect()
    };

    let rows = retain_flagged(rows, &keep);
    Table::new(columns, rows)
}

/// Treats zero as missing in `columns` and drops every row where any of them is null.
///
/// # Errors
///
/// [`AnalysisError::InvalidValue`] for a non-numeric cell.
pub fn drop_missing(table: Table, columns: &[String]) -> Result<Table> {
    let (table, _) = null_zeros(table, columns)?;
    let indices = indices_of(&table, columns)?;

    let (names, rows) = table.into_parts();
    let rows = rows
        .into_iter()
        .filter(|row| indices.iter().all(|&i| !row.values[i].is_null()))
        .collect();

    Ok(Table::new(names, rows))
}

/// Drops every row where any of `columns` is not a positive number.
///
/// Run after [`cast_integer`] so that fractions below one, truncated to
/// zero, are dropped as well.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] if a column is absent.
pub fn drop_non_positive(table: Table, columns: &[String]) -> Result<Table> {
    let indices = indices_of(&table, columns)?;

    let (names, rows) = table.into_parts();
    let rows = rows
        .into_iter()
        .filter(|row| {
            indices
                .iter()
                .all(|&i| row.values[i].as_f64().is_some_and(|n| n > 0.0))
        })
        .collect();

    Ok(Table::new(names, rows))
}

/// Coerces `columns` to numbers and replaces zeros with null. Rows are kept.
///
/// # Errors
///
/// [`AnalysisError::InvalidValue`] for a non-numeric cell.
pub fn zero_as_missing(table: Table, columns: &[String]) -> Result<Table> {
    null_zeros(table, columns).map(|(table, _)| table)
}

fn null_zeros(table: Table, columns: &[String]) -> Result<(Table, usize)> {
    let indices = indices_of(&table, columns)?;
    let (names, mut rows) = table.into_parts();
    let mut nulled = 0;

    for row in &mut rows {
        for &i in &indices {
            let number = row.values[i]
                .to_number()
                .ok_or_else(|| invalid_value(&names[i], row, i, "a number"))?;
            row.values[i] = if number.is_zero() {
                nulled += 1;
                Value::Null
            } else {
                number
            };
        }
    }

    Ok((Table::new(names, rows), nulled))
}

/// Parses `column` into dates.
///
/// Accepts `YYYY-MM-DD`, `M/D/YYYY` and `M/D/YY`. For two-digit years the
/// optional `year_column` decides the century; without it chrono's pivot
/// applies (`00`–`68` map to the 2000s).
///
/// # Errors
///
/// [`AnalysisError::InvalidValue`] for a cell that matches none of the formats.
pub fn parse_dates(table: Table, column: &str, year_column: Option<&str>) -> Result<Table> {
    let idx = table.column_index(column)?;
    let year_idx = year_column.and_then(|name| table.column_index(name).ok());
    let (names, mut rows) = table.into_parts();

    for row in &mut rows {
        let parsed = match &row.values[idx] {
            Value::Text(raw) => {
                let year_hint = year_idx.and_then(|y| year_of(&row.values[y]));
                parse_date(raw, year_hint)
                    .ok_or_else(|| invalid_value(&names[idx], row, idx, "a date"))?
            }
            Value::Null | Value::Date(_) => continue,
            _ => return Err(invalid_value(&names[idx], row, idx, "a date")),
        };
        row.values[idx] = Value::Date(parsed);
    }

    Ok(Table::new(names, rows))
}

fn year_of(value: &Value) -> Option<i32> {
    match value {
        Value::Int(n) => i32::try_from(*n).ok(),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_date(raw: &str, year_hint: Option<i32>) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let two_digit_year = raw.rsplit('/').next().is_some_and(|y| y.len() == 2);
    if !two_digit_year {
        return NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok();
    }

    let date = NaiveDate::parse_from_str(raw, "%m/%d/%y").ok()?;
    match year_hint {
        Some(year) if year.checked_sub(date.year()).is_some_and(|d| d != 0 && d % 100 == 0) => {
            // 2/29/00 has no 1900 counterpart; keep chrono's reading
            Some(date.with_year(year).unwrap_or(date))
        }
        _ => Some(date),
    }
}

/// Casts `columns` to `i64`, truncating fractional values.
///
/// # Errors
///
/// [`AnalysisError::InvalidValue`] for null, non-numeric or out-of-range cells.
pub fn cast_integer(table: Table, columns: &[String]) -> Result<Table> {
    let indices = indices_of(&table, columns)?;
    let (names, mut rows) = table.into_parts();

    for row in &mut rows {
        for &i in &indices {
            let cast = match row.values[i].to_number() {
                Some(Value::Int(n)) => Some(n),
                Some(Value::Float(f)) if f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
                _ => None,
            };
            let n = cast.ok_or_else(|| invalid_value(&names[i], row, i, "an integer"))?;
            row.values[i] = Value::Int(n);
        }
    }

    Ok(Table::new(names, rows))
}

/// Appends `profit = revenue - budget`, replacing an existing `profit` column.
///
/// # Errors
///
/// [`AnalysisError::InvalidValue`] when budget or revenue is not an integer
/// or the difference overflows.
pub fn derive_profit(table: Table) -> Result<Table> {
    let budget_idx = table.column_index(BUDGET)?;
    let revenue_idx = table.column_index(REVENUE)?;
    let existing = table.column_index(PROFIT).ok();
    let (mut names, mut rows) = table.into_parts();

    for row in &mut rows {
        let budget = row.values[budget_idx]
            .as_i64()
            .ok_or_else(|| invalid_value(&names[budget_idx], row, budget_idx, "an integer"))?;
        let revenue = row.values[revenue_idx]
            .as_i64()
            .ok_or_else(|| invalid_value(&names[revenue_idx], row, revenue_idx, "an integer"))?;
        let profit = revenue.checked_sub(budget).ok_or_else(|| {
            invalid_value(&names[revenue_idx], row, revenue_idx, "a profit within i64 range")
        })?;

        match existing {
            Some(i) => row.values[i] = Value::Int(profit),
            None => row.values.push(Value::Int(profit)),
        }
    }

    if existing.is_none() {
        names.push(PROFIT.to_string());
    }
    Ok(Table::new(names, rows))
}

fn indices_of(table: &Table, columns: &[String]) -> Result<Vec<usize>> {
    columns.iter().map(|c| table.column_index(c)).collect()
}

fn invalid_value(column: &str, row: &Row, idx: usize, expected: &'static str) -> AnalysisError {
    AnalysisError::InvalidValue {
        column: column.to_string(),
        row: row.source_row,
        value: row.values[idx].to_string(),
        expected,
    }
}
