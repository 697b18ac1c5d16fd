pub mod analyzers;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod table;

pub use error::{AnalysisError, ErrorCategory, Result};
pub use table::{Row, RowView, Table, Value};
