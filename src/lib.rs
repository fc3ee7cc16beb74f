#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Per-file metadata derivation (hostname, firmware, test kind).
pub mod classify;
/// Per-bucket, per-kind table compilation.
pub mod compile;
/// Run configuration passed into each component.
pub mod config;
/// Centralized constants for classification, sheets, and packaging.
pub mod constants;
/// Bucketing of classified files by hostname and firmware.
pub mod group;
/// Run orchestration and the final tally.
pub mod report;
/// In-memory tables read from CSV files.
pub mod table;
/// Shared type aliases.
pub mod types;
/// Template workbook population and pivot rebinding.
pub mod workbook;

mod errors;

pub use classify::{ALL_KINDS, Classifier, FileMetadata, TestKind};
pub use compile::{CompiledBucket, compile_bucket, compile_test_data};
pub use config::ReportConfig;
pub use errors::ReportError;
pub use group::{Bucket, BucketMap, GroupKey, group_files};
pub use report::{ReportDriver, RunSummary, scan_csv_files};
pub use table::{Cell, Table, concat_tables, read_csv_table};
pub use types::{CellRangeRef, ColumnName, FirmwareVersion, Hostname, PartName, SheetName};
pub use workbook::TemplatePopulator;
