use chrono::Utc;
use tracing::{info, warn};

use crate::analyzers::aggregate::{
    Comparison, Extremum, extremum, filter_by_threshold, frequency_count, mean,
};
use crate::analyzers::series::{histogram, scatter};
use crate::analyzers::types::{ChartSeries, ColumnExtremes, NamedScatter, ProfitableSubset, Report};
use crate::cleaner::{BUDGET, CleaningSummary, PROFIT, REVENUE};
use crate::config::ReportConfig;
use crate::error::{AnalysisError, Result};
use crate::table::Table;

pub const RUNTIME: &str = "runtime";
pub const GENRES: &str = "genres";
pub const CAST: &str = "cast";

/// Columns whose highest and lowest movies are reported, in report order.
pub const EXTREME_COLUMNS: &[&str] = &[PROFIT, RUNTIME, BUDGET, REVENUE];

/// Answers the fixed research questions over a cleaned table.
///
/// A column with no values, such as an all-null runtime, is answered with
/// `None` rather than an error. So is an empty profitable subset.
///
/// # Errors
///
/// [`AnalysisError::MissingColumn`] or [`AnalysisError::InvalidValue`] from
/// the underlying queries.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn analyze<'a>(
    table: &'a Table,
    cleaning: CleaningSummary,
    config: &ReportConfig,
) -> Result<Report<'a>> {
    let extremes = EXTREME_COLUMNS
        .iter()
        .map(|&column| -> Result<ColumnExtremes<'a>> {
            Ok(ColumnExtremes {
                column: column.to_string(),
                highest: optional(extremum(table, column, Extremum::Max))?,
                lowest: optional(extremum(table, column, Extremum::Min))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mean_runtime = optional(mean(table, RUNTIME))?;
    let profitable = profitable_subset(table, config)?;

    info!(
        movies = table.len(),
        profitable = profitable.as_ref().map_or(0, |p| p.movies),
        "Report built"
    );

    Ok(Report {
        generated_at: Utc::now(),
        cleaning,
        extremes,
        mean_runtime,
        profitable,
    })
}

/// Averages and frequencies over movies with `profit >= config.profit_threshold`.
pub fn profitable_subset(table: &Table, config: &ReportConfig) -> Result<Option<ProfitableSubset>> {
    let subset = profitable_movies(table, config)?;
    if subset.is_empty() {
        warn!(threshold = config.profit_threshold, "No movie reaches the profit threshold");
        return Ok(None);
    }

    let mut top_cast = frequency_count(&subset, CAST, config.separator)?;
    top_cast.truncate(config.top_cast);

    Ok(Some(ProfitableSubset {
        threshold: config.profit_threshold,
        movies: subset.len(),
        mean_budget: mean(&subset, BUDGET)?,
        mean_revenue: mean(&subset, REVENUE)?,
        mean_runtime: optional(mean(&subset, RUNTIME))?,
        genres: frequency_count(&subset, GENRES, config.separator)?,
        top_cast,
    }))
}

fn profitable_movies(table: &Table, config: &ReportConfig) -> Result<Table> {
    filter_by_threshold(
        table,
        PROFIT,
        Comparison::AtLeast,
        config.profit_threshold as f64,
    )
}

fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AnalysisError::EmptyResult { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Series for the runtime histogram, the profit scatter plots and the
/// genre and cast bar charts of the profitable subset.
///
/// The histogram is empty when no movie has a runtime.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn chart_series(table: &Table, config: &ReportConfig) -> Result<ChartSeries> {
    let scatters = [
        ("profit_vs_runtime", RUNTIME, PROFIT),
        ("profit_vs_budget", BUDGET, PROFIT),
        ("profit_vs_revenue", REVENUE, PROFIT),
        ("budget_vs_revenue", REVENUE, BUDGET),
    ]
    .into_iter()
    .map(|(name, x, y)| -> Result<NamedScatter> {
        Ok(NamedScatter {
            name: name.to_string(),
            x_column: x.to_string(),
            y_column: y.to_string(),
            points: scatter(table, x, y)?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    let subset = profitable_movies(table, config)?;
    let mut top_cast = frequency_count(&subset, CAST, config.separator)?;
    top_cast.truncate(config.top_cast);

    Ok(ChartSeries {
        runtime_histogram: optional(histogram(table, RUNTIME, config.histogram_bins))?
            .unwrap_or_default(),
        scatters,
        genres: frequency_count(&subset, GENRES, config.separator)?,
        top_cast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{RowView, Value};

    fn cleaned() -> Table {
        Table::from_rows(
            &["original_title", "budget", "revenue", "runtime", "genres", "cast", "profit"],
            vec![
                vec![
                    "Big".into(),
                    Value::Int(100_000_000),
                    Value::Int(200_000_000),
                    Value::Int(130),
                    "Action|Adventure".into(),
                    "Tom Cruise|Ving Rhames".into(),
                    Value::Int(100_000_000),
                ],
                vec![
                    "Flop".into(),
                    Value::Int(50_000_000),
                    Value::Int(10_000_000),
                    Value::Null,
                    "Drama".into(),
                    "Tom Hanks".into(),
                    Value::Int(-40_000_000),
                ],
                vec![
                    "Steady".into(),
                    Value::Int(20_000_000),
                    Value::Int(45_000_000),
                    Value::Int(100),
                    "Drama|Action".into(),
                    "Tom Cruise".into(),
                    Value::Int(25_000_000),
                ],
            ],
        )
        .unwrap()
    }

    fn title(row: Option<RowView<'_>>) -> Option<Value> {
        row.and_then(|r| r.get("original_title")).cloned()
    }

    #[test]
    fn test_analyze_fixed_questions() {
        let table = cleaned();
        let report = analyze(&table, CleaningSummary::default(), &ReportConfig::default()).unwrap();

        let columns: Vec<_> = report.extremes.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, EXTREME_COLUMNS);

        let profit = &report.extremes[0];
        assert_eq!(title(profit.highest), Some(Value::from("Big")));
        assert_eq!(title(profit.lowest), Some(Value::from("Flop")));

        assert_eq!(report.mean_runtime, Some(115.0));

        let profitable = report.profitable.unwrap();
        assert_eq!(profitable.movies, 2);
        assert_eq!(profitable.mean_budget, 60_000_000.0);
        assert_eq!(profitable.mean_revenue, 122_500_000.0);
        assert_eq!(profitable.mean_runtime, Some(115.0));
        assert_eq!(profitable.genres[0].token, "Action");
        assert_eq!(profitable.genres[0].count, 2);
        assert_eq!(profitable.top_cast[0].token, "Tom Cruise");
    }

    #[test]
    fn test_analyze_no_profitable_movies() {
        let table = cleaned();
        let config = ReportConfig {
            profit_threshold: 1_000_000_000,
            ..Default::default()
        };

        let report = analyze(&table, CleaningSummary::default(), &config).unwrap();
        assert!(report.profitable.is_none());
    }

    fn without_runtimes() -> Table {
        Table::from_rows(
            &["original_title", "budget", "revenue", "runtime", "genres", "cast", "profit"],
            vec![vec![
                "Short Cut".into(),
                Value::Int(1_000_000),
                Value::Int(30_000_000),
                Value::Null,
                "Comedy".into(),
                "Tom Hanks".into(),
                Value::Int(29_000_000),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn test_analyze_without_runtimes() {
        let table = without_runtimes();
        let report = analyze(&table, CleaningSummary::default(), &ReportConfig::default()).unwrap();

        let runtime = &report.extremes[1];
        assert_eq!(runtime.column, RUNTIME);
        assert!(runtime.highest.is_none());
        assert!(runtime.lowest.is_none());
        assert!(report.extremes[0].highest.is_some());
        assert_eq!(report.mean_runtime, None);

        let profitable = report.profitable.unwrap();
        assert_eq!(profitable.movies, 1);
        assert_eq!(profitable.mean_runtime, None);
    }

    #[test]
    fn test_analyze_empty_table() {
        let table = Table::from_rows(
            &["budget", "revenue", "runtime", "genres", "cast", "profit"],
            vec![],
        )
        .unwrap();

        let report = analyze(&table, CleaningSummary::default(), &ReportConfig::default()).unwrap();

        assert!(report.extremes.iter().all(|e| e.highest.is_none() && e.lowest.is_none()));
        assert!(report.profitable.is_none());
    }

    #[test]
    fn test_analyze_missing_column_still_fails() {
        let table = Table::from_rows(&["budget", "revenue", "profit"], vec![]).unwrap();
        let err = analyze(&table, CleaningSummary::default(), &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));
    }

    #[test]
    fn test_chart_series() {
        let table = cleaned();
        let config = ReportConfig {
            top_cast: 1,
            histogram_bins: 3,
            ..Default::default()
        };

        let series = chart_series(&table, &config).unwrap();

        assert_eq!(series.runtime_histogram.len(), 3);
        assert_eq!(series.scatters.len(), 4);
        // the row with a null runtime has no runtime point
        assert_eq!(series.scatters[0].points.len(), 2);
        assert_eq!(series.scatters[1].points.len(), 3);
        assert_eq!(series.top_cast.len(), 1);
    }

    #[test]
    fn test_chart_series_without_runtimes() {
        let table = without_runtimes();
        let series = chart_series(&table, &ReportConfig::default()).unwrap();

        assert!(series.runtime_histogram.is_empty());
        assert!(series.scatters[0].points.is_empty());
        assert_eq!(series.genres[0].token, "Comedy");
    }
}
