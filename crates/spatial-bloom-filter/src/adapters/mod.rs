//! Adapters Layer (Driven Adapters)
//!
//! File-backed implementations of the driven ports plus report export.
//!
//! ## Adapters
//!
//! - `FileSaltStore` - Base64 salt file, optionally created on first use
//! - `StaticSalts` - In-memory salts for tests and ephemeral filters
//! - `CsvRecordSource` - Delimited dataset reader
//! - `write_report` / `save_report` - `;`-delimited statistics and cell reports

pub mod dataset;
pub mod report;
pub mod salt_file;

pub use dataset::{CsvRecordSource, DEFAULT_DELIMITER};
pub use report::{
    save_report, write_report, write_statistics, ReportMode, AREA_COLUMNS, REPORT_DELIMITER,
};
pub use salt_file::{FileSaltStore, StaticSalts};
