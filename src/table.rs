//! In-memory movie table.
//!
//! A [`Table`] is an ordered list of column names and an ordered list of
//! [`Row`]s. Cells are [`Value`]s, with [`Value::Null`] as the only way to
//! express a missing value.

use chrono::NaiveDate;
use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{AnalysisError, Result};

/// A single table cell.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell. Text, dates and nulls have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerces the cell to `Int` or `Float`.
    ///
    /// Nulls stay null. Returns `None` when the cell cannot be read as a
    /// finite number.
    pub fn to_number(&self) -> Option<Value> {
        match self {
            Value::Null | Value::Int(_) => Some(self.clone()),
            Value::Float(f) if f.is_finite() => Some(self.clone()),
            Value::Text(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    Some(Value::Int(n))
                } else {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(Value::Float)
                }
            }
            _ => None,
        }
    }

    /// True for numeric zero (`0` or `0.0`).
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            _ => false,
        }
    }
}

// Floats compare by bit pattern so that rows can be hashed for deduplication.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Text(s) => s.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// One movie record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 0-based position of the record in the input file.
    pub(crate) source_row: usize,
    pub(crate) values: Vec<Value>,
}

impl Row {
    pub fn new(source_row: usize, values: Vec<Value>) -> Self {
        Self { source_row, values }
    }

    pub fn source_row(&self) -> usize {
        self.source_row
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Callers must keep every row exactly as wide as `columns`.
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.values.len() == columns.len()));
        Self { columns, rows }
    }

    /// Builds a table, checking that every row has one value per column.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::RowWidth`] for the first row of the wrong width.
    pub fn try_new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.values.len() != columns.len()) {
            return Err(AnalysisError::RowWidth {
                row: row.source_row,
                expected: columns.len(),
                found: row.values.len(),
            });
        }
        Ok(Self::new(columns, rows))
    }

    /// Builds a table from plain cell vectors, numbering rows by position.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::RowWidth`] when a row is wider or narrower than `columns`.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Result<Self> {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| Row::new(i, values))
            .collect();
        Self::try_new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of `name` among the columns.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingColumn`] if there is no such column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AnalysisError::missing_column(name))
    }

    /// Iterates `(row, cell)` pairs of one column in table order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = (&Row, &Value)>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |r| (r, &r.values[idx])))
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|row| RowView {
            columns: &self.columns,
            row,
        })
    }

    pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|row| RowView {
            columns: &self.columns,
            row,
        })
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

/// A row paired with the column names of its table.
///
/// Serializes as a JSON object keyed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.row.values[i])
    }

    pub fn source_row(&self) -> usize {
        self.row.source_row
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + use<'a> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.row.values.iter())
    }
}

impl Serialize for RowView<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            &["original_title", "budget"],
            vec![
                vec!["Jurassic World".into(), Value::Int(150_000_000)],
                vec!["Mad Max".into(), Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_index_missing() {
        let table = sample();
        assert_eq!(table.column_index("budget").unwrap(), 1);
        assert!(matches!(
            table.column_index("revenue"),
            Err(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Table::from_rows(
            &["original_title", "budget"],
            vec![vec!["Jurassic World".into(), Value::Int(1)], vec!["Mad Max".into()]],
        )
        .unwrap_err();

        match err {
            AnalysisError::RowWidth {
                row,
                expected,
                found,
            } => assert_eq!((row, expected, found), (1, 2, 1)),
            other => panic!("unexpected error: {other}"),
        }

        let wide = vec![Row::new(0, vec![Value::Null, Value::Null, Value::Null])];
        let err = Table::try_new(vec!["budget".into()], wide).unwrap_err();
        assert_eq!(err.category(), crate::ErrorCategory::DataFormat);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::from("42").to_number(), Some(Value::Int(42)));
        assert_eq!(Value::from(" 1.5 ").to_number(), Some(Value::Float(1.5)));
        assert_eq!(Value::Null.to_number(), Some(Value::Null));
        assert_eq!(Value::from("n/a").to_number(), None);
        assert_eq!(Value::from("NaN").to_number(), None);
    }

    #[test]
    fn test_float_equality_by_bits() {
        assert_eq!(Value::Float(0.5), Value::Float(0.5));
        assert_ne!(Value::Float(0.5), Value::Int(0));
        assert_ne!(Value::Int(1), Value::Text("1".into()));
    }

    #[test]
    fn test_row_view_serializes_as_object() {
        let table = sample();
        let json = serde_json::to_value(table.row(0).unwrap()).unwrap();
        assert_eq!(json["original_title"], "Jurassic World");
        assert_eq!(json["budget"], 150_000_000);

        let json = serde_json::to_value(table.row(1).unwrap()).unwrap();
        assert!(json["budget"].is_null());
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2015, 6, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2015-06-09");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(-3).to_string(), "-3");
    }
}
