//! Data types produced by the report pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::aggregate::TokenCount;
use crate::analyzers::series::{HistogramBin, ScatterPoint};
use crate::cleaner::CleaningSummary;
use crate::table::RowView;

/// Highest and lowest movie for one numeric column.
///
/// Both are `None` when the column holds no values.
#[derive(Debug, Serialize)]
pub struct ColumnExtremes<'a> {
    pub column: String,
    pub highest: Option<RowView<'a>>,
    pub lowest: Option<RowView<'a>>,
}

/// Averages and frequencies over movies whose profit reaches the threshold.
#[derive(Debug, Serialize)]
pub struct ProfitableSubset {
    pub threshold: i64,
    pub movies: usize,
    pub mean_budget: f64,
    pub mean_revenue: f64,
    pub mean_runtime: Option<f64>,
    pub genres: Vec<TokenCount>,
    pub top_cast: Vec<TokenCount>,
}

/// Answers to the fixed research questions, serialized as JSON by `report --format json`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub generated_at: DateTime<Utc>,
    pub cleaning: CleaningSummary,
    pub extremes: Vec<ColumnExtremes<'a>>,
    pub mean_runtime: Option<f64>,
    /// `None` when no movie reaches the profit threshold.
    pub profitable: Option<ProfitableSubset>,
}

#[derive(Debug, Serialize)]
pub struct NamedScatter {
    pub name: String,
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<ScatterPoint>,
}

/// Every series the charts of the analysis are drawn from.
#[derive(Debug, Serialize)]
pub struct ChartSeries {
    pub runtime_histogram: Vec<HistogramBin>,
    pub scatters: Vec<NamedScatter>,
    pub genres: Vec<TokenCount>,
    pub top_cast: Vec<TokenCount>,
}
