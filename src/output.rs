//! Output formatting and persistence for tables, reports and chart series.
//!
//! Supports a plain-text report, JSON serialization, and CSV export
//! (optionally gzip-compressed).

use anyhow::Result;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{ChartSeries, Report};
use crate::table::{RowView, Table, Value};

/// Renders a report as plain text, one question per block.
pub fn render_report(report: &Report<'_>) -> String {
    let c = &report.cleaning;
    let mut lines = vec![
        format!(
            "Loaded {} rows; dropped {} columns, {} duplicates and {} rows without budget or revenue.",
            c.rows_loaded, c.columns_dropped, c.duplicates_removed, c.missing_financials_removed
        ),
        format!(
            "Cleaned table: {} rows, {} columns.",
            c.rows_remaining, c.columns_remaining
        ),
    ];

    for extremes in &report.extremes {
        lines.push(format!("\n{}", extremes.column));
        lines.push(format!("  highest: {}", describe_row(extremes.highest, &extremes.column)));
        lines.push(format!("  lowest:  {}", describe_row(extremes.lowest, &extremes.column)));
    }

    lines.push(format!(
        "\nAverage runtime: {}",
        fmt_optional(report.mean_runtime, "minutes")
    ));

    match &report.profitable {
        Some(p) => {
            lines.push(format!("\nMovies with profit >= {}: {}", p.threshold, p.movies));
            lines.push(format!("  average budget:  {:.2}", p.mean_budget));
            lines.push(format!("  average revenue: {:.2}", p.mean_revenue));
            lines.push(format!(
                "  average runtime: {}",
                fmt_optional(p.mean_runtime, "minutes")
            ));
            lines.push("  genres:".to_string());
            lines.extend(p.genres.iter().map(|g| format!("    {:<20} {}", g.token, g.count)));
            lines.push("  top cast:".to_string());
            lines.extend(p.top_cast.iter().map(|c| format!("    {:<20} {}", c.token, c.count)));
        }
        None => lines.push("\nNo movie reaches the profit threshold.".to_string()),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn describe_row(row: Option<RowView<'_>>, column: &str) -> String {
    let Some(row) = row else {
        return "n/a".to_string();
    };
    let title = row
        .get("original_title")
        .map(Value::to_string)
        .unwrap_or_else(|| format!("row {}", row.source_row()));
    let value = row.get(column).map(Value::to_string).unwrap_or_default();
    format!("{} ({})", title, value)
}

fn fmt_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2} {}", v, unit),
        None => "n/a".to_string(),
    }
}

/// Serializes any value as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `table` as headered CSV, gzip-compressed when `gzip` is set.
///
/// Nulls are written as empty cells and dates as `YYYY-MM-DD`.
pub fn write_table(path: &Path, table: &Table, gzip: bool) -> Result<()> {
    debug!(path = %path.display(), gzip, "Writing table");
    let file = File::create(path)?;

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_table_to(&mut encoder, table)?;
        encoder.finish()?;
    } else {
        write_table_to(file, table)?;
    }

    info!(path = %path.display(), rows = table.len(), "Table written");
    Ok(())
}

fn write_table_to<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.values().iter().map(Value::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes serializable records as a headered CSV file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one CSV per chart series into `dir`, creating it if needed.
///
/// Returns the paths written.
pub fn write_chart_data(dir: &Path, series: &ChartSeries) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join("runtime_histogram.csv");
    write_records(&path, &series.runtime_histogram)?;
    written.push(path);

    for scatter in &series.scatters {
        let path = dir.join(format!("{}.csv", scatter.name));
        write_records(&path, &scatter.points)?;
        written.push(path);
    }

    let path = dir.join("genres.csv");
    write_records(&path, &series.genres)?;
    written.push(path);

    let path = dir.join("top_cast.csv");
    write_records(&path, &series.top_cast)?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "Chart data written");
    Ok(written)
}
