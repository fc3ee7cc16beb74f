use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::SheetName;

/// Error type for configuration, run-level termination, and workbook failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no csv files found under '{0}'")]
    NoInputFiles(PathBuf),
    #[error("no csv files could be grouped into reports")]
    NoBuckets,
    #[error("no grouped data matches requested hosts: {0}")]
    HostFilterUnmatched(String),
    #[error("template workbook '{path}' is unusable: {reason}")]
    Template { path: PathBuf, reason: String },
    #[error("sheet '{0}' not found in template workbook")]
    MissingSheet(SheetName),
    #[error("workbook xml is malformed: {0}")]
    Xml(String),
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<quick_xml::Error> for ReportError {
    fn from(err: quick_xml::Error) -> Self {
        ReportError::Xml(err.to_string())
    }
}
