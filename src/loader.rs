//! CSV loader for the movie table.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::table::{Row, Table, Value};

/// Columns the cleaning pipeline and the fixed questions rely on.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "budget",
    "revenue",
    "runtime",
    "release_date",
    "genres",
    "cast",
];

/// Reads a CSV file into a [`Table`], gunzipping it first when the path ends in `.gz`.
///
/// The file handle is closed before this function returns.
///
/// # Errors
///
/// [`AnalysisError::Io`] if the file cannot be opened, otherwise the errors of
/// [`load_reader`].
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_path(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(gzipped, "Reading CSV");

    let table = if gzipped {
        load_reader(GzDecoder::new(file))?
    } else {
        load_reader(file)?
    };

    info!(
        rows = table.len(),
        columns = table.columns().len(),
        "Table loaded"
    );
    Ok(table)
}

/// Reads headered CSV from any reader.
///
/// Empty cells become [`Value::Null`]; everything else is kept as text for the
/// cleaner to convert.
///
/// # Errors
///
/// [`AnalysisError::NoHeader`] for empty input and [`AnalysisError::Malformed`]
/// for ragged records, invalid UTF-8 or read failures.
pub fn load_reader<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?;
    if headers.is_empty() {
        return Err(AnalysisError::NoHeader);
    }
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let values = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    Value::Null
                } else {
                    Value::Text(cell.to_string())
                }
            })
            .collect();
        rows.push(Row::new(i, values));
    }

    Ok(Table::new(columns, rows))
}

/// Checks that every column in `names` is present.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] naming the first absent column.
pub fn require_columns(table: &Table, names: &[&str]) -> Result<()> {
    for name in names {
        table.column_index(name)?;
    }
    Ok(())
}
