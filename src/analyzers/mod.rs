//! Read-only queries over the cleaned movie table.
//!
//! [`aggregate`] holds the primitive queries (extremum, mean, threshold
//! filter, token frequencies); [`analyzer`] combines them into the fixed
//! report and the chart series.

pub mod aggregate;
pub mod analyzer;
pub mod describe;
pub mod series;
pub mod types;
pub mod utility;
