use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::classify::TestKind;
use crate::group::Bucket;
use crate::table::{Table, concat_tables, read_csv_table};

/// The per-kind compiled tables of one bucket.
#[derive(Clone, Debug, Default)]
pub struct CompiledBucket {
    /// Merged PRBS rows, absent when no PRBS file yielded data.
    pub prbs: Option<Table>,
    /// Merged packet-data rows, absent when no DATA file yielded data.
    pub data: Option<Table>,
}

impl CompiledBucket {
    /// The compiled table for one kind, if any.
    pub fn table(&self, kind: TestKind) -> Option<&Table> {
        match kind {
            TestKind::Prbs => self.prbs.as_ref(),
            TestKind::Data => self.data.as_ref(),
        }
    }

    /// True when neither kind produced rows.
    pub fn is_empty(&self) -> bool {
        self.prbs.is_none() && self.data.is_none()
    }
}

/// Compile both kinds of one bucket.
///
/// A kind with no files at all skips compilation silently; a kind whose
/// files were all unusable compiles to absent with warnings.
pub fn compile_bucket(bucket: &Bucket) -> CompiledBucket {
    let compile_kind = |kind: TestKind| {
        let files = bucket.files(kind);
        if files.is_empty() {
            None
        } else {
            compile_test_data(files, kind)
        }
    };
    CompiledBucket {
        prbs: compile_kind(TestKind::Prbs),
        data: compile_kind(TestKind::Data),
    }
}

/// Merge all files of one kind into a single table.
///
/// Each file is read independently; a read failure or an empty file is
/// skipped with a warning and never aborts the batch. Returns `None` when no
/// file yielded rows.
pub fn compile_test_data(files: &[PathBuf], kind: TestKind) -> Option<Table> {
    if files.is_empty() {
        warn!(kind = kind.as_str(), "no csv files provided for test kind");
        return None;
    }

    let mut tables = Vec::new();
    for path in files {
        match read_csv_table(path) {
            Ok(table) if table.is_empty() => {
                warn!(path = %path.display(), "csv file has no data rows");
            }
            Ok(table) => {
                debug!(
                    path = %path.display(),
                    rows = table.row_count(),
                    "loaded csv file"
                );
                tables.push(table);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read csv file");
            }
        }
    }

    if tables.is_empty() {
        warn!(kind = kind.as_str(), "no usable data found for test kind");
        return None;
    }

    let file_count = tables.len();
    let combined = concat_tables(tables);
    info!(
        kind = kind.as_str(),
        rows = combined.row_count(),
        files = file_count,
        "compiled test data"
    );
    Some(combined)
}
