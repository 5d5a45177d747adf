//! Sales report builder.
//!
//! Loads comma-separated sales records, summarizes Net_Sales by region,
//! product and month, and renders a five-sheet XLSX report with charts.
//!
//! ```no_run
//! let csv = std::fs::read("sales.csv")?;
//! let table = sales_report::load(&csv)?;
//! let bytes = sales_report::generate(&table)?;
//! std::fs::write(sales_report::DEFAULT_FILENAME, bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod encode;
pub mod error;
pub mod layout;
pub mod loader;
pub mod models;
pub mod styles;

use chrono::{Local, NaiveDateTime};
use tracing::info;

pub use aggregate::summarize;
pub use error::{ReportError, Result};
pub use layout::{assemble, ReportDocument, SHEET_NAMES};
pub use loader::{load, preview, DEFAULT_PREVIEW_ROWS};
pub use models::{AggregateRow, MonthPeriod, Preview, RecordTable, SalesRecord, Summaries};
pub use styles::ReportStyles;

pub const MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const DEFAULT_FILENAME: &str = "sales_report.xlsx";

/// Builds the report for `table`, stamped with the current local time.
pub fn generate(table: &RecordTable) -> Result<Vec<u8>> {
    generate_at(table, Local::now().naive_local())
}

/// Either the complete workbook is returned or nothing is.
pub fn generate_at(table: &RecordTable, generated_at: NaiveDateTime) -> Result<Vec<u8>> {
    let summaries = summarize(table)?;
    let document = assemble(table, &summaries, generated_at, &ReportStyles::default());
    let bytes = encode::encode(&document)?;
    info!(
        rows = table.len(),
        bytes = bytes.len(),
        "generated sales report"
    );
    Ok(bytes)
}
