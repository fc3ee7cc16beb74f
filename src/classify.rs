use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::classify::{
    FILENAME_MARKER_DATA, FILENAME_MARKER_PRBS, FIRMWARE_PATTERN_BARE, FIRMWARE_PATTERN_PREFIXED,
    HOST_COLUMN, TEST_TYPE_COLUMN, TEST_TYPE_DATA_VALUE, TEST_TYPE_PRBS_VALUE,
};
use crate::constants::sheets;
use crate::types::{FirmwareVersion, Hostname, SheetName};

/// The two recognized test-result categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestKind {
    /// SerDes PRBS lane measurements.
    Prbs,
    /// Simple-packet data runs.
    Data,
}

/// Canonical iteration order over the recognized kinds.
pub const ALL_KINDS: [TestKind; 2] = [TestKind::Prbs, TestKind::Data];

impl TestKind {
    /// Short display label used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Prbs => "PRBS",
            TestKind::Data => "DATA",
        }
    }

    /// Template sheet receiving this kind's compiled rows.
    pub fn raw_sheet(&self) -> SheetName {
        match self {
            TestKind::Prbs => sheets::RAW_PRBS.to_string(),
            TestKind::Data => sheets::RAW_DATA.to_string(),
        }
    }

    /// Template summary sheet whose pivots read this kind's raw sheet.
    pub fn summary_sheet(&self) -> SheetName {
        match self {
            TestKind::Prbs => sheets::PRBS_SUMMARY.to_string(),
            TestKind::Data => sheets::DATA_SUMMARY.to_string(),
        }
    }
}

/// Metadata derived for one input file.
///
/// Every field is explicitly optional; a file with any absent field is
/// excluded from grouping rather than treated as an error.
#[derive(Clone, Debug)]
pub struct FileMetadata {
    /// Path the metadata was derived from.
    pub path: PathBuf,
    /// Hostname read from the file's first data row.
    pub hostname: Option<Hostname>,
    /// Firmware version extracted from the filename.
    pub firmware: Option<FirmwareVersion>,
    /// Recognized test kind, from content or filename.
    pub kind: Option<TestKind>,
}

impl FileMetadata {
    /// True when every grouping field was derived successfully.
    pub fn is_classified(&self) -> bool {
        self.hostname.is_some() && self.firmware.is_some() && self.kind.is_some()
    }
}

/// First-data-row snapshot of a CSV file, shared by the content strategies.
struct FirstRowProbe {
    headers: Vec<String>,
    first_row: Option<Vec<String>>,
}

impl FirstRowProbe {
    /// Value of a named column in the first data row, if both exist.
    fn first_value(&self, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|header| header == column)?;
        self.first_row
            .as_ref()
            .and_then(|row| row.get(idx))
            .map(String::as_str)
    }
}

/// One probe in the ordered test-kind detection chain.
///
/// Strategies are tried in [`KIND_STRATEGIES`] order until one returns a
/// kind; each is free to fail without consequence for the next.
#[derive(Clone, Copy, Debug)]
enum KindStrategy {
    /// Match the `test_type` column of the first data row.
    ContentColumn,
    /// Match case-insensitive filename markers.
    FilenameMarker,
}

/// Detection order: file content wins over filename markers.
const KIND_STRATEGIES: [KindStrategy; 2] =
    [KindStrategy::ContentColumn, KindStrategy::FilenameMarker];

impl KindStrategy {
    fn probe(&self, path: &Path, probe: Option<&FirstRowProbe>) -> Option<TestKind> {
        match self {
            KindStrategy::ContentColumn => {
                let probe = probe?;
                if !probe.headers.iter().any(|header| header == TEST_TYPE_COLUMN) {
                    warn!(
                        path = %path.display(),
                        column = TEST_TYPE_COLUMN,
                        "csv file lacks the test-type column"
                    );
                    return None;
                }
                let value = probe.first_value(TEST_TYPE_COLUMN)?;
                match value {
                    TEST_TYPE_PRBS_VALUE => Some(TestKind::Prbs),
                    TEST_TYPE_DATA_VALUE => Some(TestKind::Data),
                    other => {
                        warn!(
                            path = %path.display(),
                            value = other,
                            "unknown test-type value"
                        );
                        None
                    }
                }
            }
            KindStrategy::FilenameMarker => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_lowercase())?;
                if name.contains(FILENAME_MARKER_PRBS) {
                    Some(TestKind::Prbs)
                } else if name.contains(FILENAME_MARKER_DATA) {
                    Some(TestKind::Data)
                } else {
                    None
                }
            }
        }
    }
}

/// Derives `(hostname, firmware, kind)` for single files.
///
/// Pure with respect to the filesystem: one bounded read of the file's first
/// data row, no writes, warnings as the only side effect.
pub struct Classifier {
    firmware_prefixed: Regex,
    firmware_bare: Regex,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Create a classifier with the firmware patterns compiled once.
    pub fn new() -> Self {
        Self {
            firmware_prefixed: Regex::new(FIRMWARE_PATTERN_PREFIXED)
                .expect("prefixed firmware pattern is valid"),
            firmware_bare: Regex::new(FIRMWARE_PATTERN_BARE)
                .expect("bare firmware pattern is valid"),
        }
    }

    /// Classify one file from its content and name.
    pub fn classify(&self, path: &Path) -> FileMetadata {
        let probe = read_first_row(path);
        let hostname = self.extract_hostname(path, probe.as_ref());
        let firmware = self.extract_firmware(path);
        let kind = KIND_STRATEGIES
            .iter()
            .find_map(|strategy| strategy.probe(path, probe.as_ref()));
        if kind.is_none() {
            warn!(path = %path.display(), "could not identify test kind");
        }
        FileMetadata {
            path: path.to_path_buf(),
            hostname,
            firmware,
            kind,
        }
    }

    /// Extract a firmware version from the filename, specific pattern first.
    pub fn extract_firmware(&self, path: &Path) -> Option<FirmwareVersion> {
        let name = path.file_name()?.to_string_lossy();
        let found = self
            .firmware_prefixed
            .find(&name)
            .or_else(|| self.firmware_bare.find(&name))
            .map(|m| m.as_str().to_string());
        if found.is_none() {
            warn!(path = %path.display(), "could not extract firmware version from filename");
        }
        found
    }

    fn extract_hostname(&self, path: &Path, probe: Option<&FirstRowProbe>) -> Option<Hostname> {
        let Some(probe) = probe else {
            return None;
        };
        if !probe.headers.iter().any(|header| header == HOST_COLUMN) {
            warn!(
                path = %path.display(),
                column = HOST_COLUMN,
                "csv file lacks the host column"
            );
            return None;
        }
        let value = probe.first_value(HOST_COLUMN).map(str::trim);
        match value {
            Some(host) if !host.is_empty() => Some(host.to_string()),
            _ => {
                warn!(path = %path.display(), "empty hostname in first data row");
                None
            }
        }
    }
}

/// Read headers plus the first data row, recovering from every failure.
fn read_first_row(path: &Path) -> Option<FirstRowProbe> {
    let mut reader = match csv::ReaderBuilder::new().has_headers(true).from_path(path) {
        Ok(reader) => reader,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to open csv file");
            return None;
        }
    };
    let headers = match reader.headers() {
        Ok(headers) => headers.iter().map(|header| header.to_string()).collect(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read csv header");
            return None;
        }
    };
    let first_row = match reader.records().next() {
        Some(Ok(record)) => Some(record.iter().map(|field| field.to_string()).collect()),
        Some(Err(err)) => {
            warn!(path = %path.display(), error = %err, "failed to read first csv row");
            return None;
        }
        None => None,
    };
    Some(FirstRowProbe { headers, first_row })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn classify_file(name: &str, contents: &str) -> FileMetadata {
        let temp = tempdir().unwrap();
        let path = temp.path().join(name);
        fs::write(&path, contents).unwrap();
        Classifier::new().classify(&path)
    }

    #[test]
    fn prefixed_firmware_pattern_wins_over_bare() {
        let classifier = Classifier::new();
        let path = Path::new("SYS1_erisc_v1_7_103_prbs_test.csv");
        assert_eq!(
            classifier.extract_firmware(path),
            Some("erisc_v1_7_103".to_string())
        );
    }

    #[test]
    fn bare_firmware_pattern_applies_without_prefix() {
        let classifier = Classifier::new();
        assert_eq!(
            classifier.extract_firmware(Path::new("sys_v2_0_14_data_test.csv")),
            Some("v2_0_14".to_string())
        );
        assert_eq!(
            classifier.extract_firmware(Path::new("sys_v2.0.14_data_test.csv")),
            Some("v2.0.14".to_string())
        );
        assert_eq!(classifier.extract_firmware(Path::new("sys_results.csv")), None);
    }

    #[test]
    fn content_column_decides_kind_before_filename() {
        let metadata = classify_file(
            "SYS1_erisc_v1_7_103_data_test.csv",
            "host,test_type\nh1,TestType.SERDES_PRBS\n",
        );
        assert_eq!(metadata.kind, Some(TestKind::Prbs));
        assert_eq!(metadata.hostname.as_deref(), Some("h1"));
        assert!(metadata.is_classified());
    }

    #[test]
    fn filename_marker_is_the_fallback_for_unknown_values() {
        let metadata = classify_file(
            "SYS1_erisc_v1_7_103_prbs_test.csv",
            "host,test_type\nh1,TestType.BOGUS\n",
        );
        assert_eq!(metadata.kind, Some(TestKind::Prbs));
    }

    #[test]
    fn unrecognized_value_and_no_marker_yields_absent_kind() {
        let metadata = classify_file(
            "SYS1_erisc_v1_7_103_run.csv",
            "host,test_type\nh1,TestType.BOGUS\n",
        );
        assert_eq!(metadata.kind, None);
        assert!(!metadata.is_classified());
    }

    #[test]
    fn missing_host_column_yields_absent_hostname() {
        let metadata = classify_file(
            "SYS1_erisc_v1_7_103_prbs_test.csv",
            "lane,test_type\n0,TestType.SERDES_PRBS\n",
        );
        assert_eq!(metadata.hostname, None);
        assert_eq!(metadata.kind, Some(TestKind::Prbs));
    }

    #[test]
    fn empty_hostname_yields_absent_hostname() {
        let metadata = classify_file(
            "SYS1_erisc_v1_7_103_prbs_test.csv",
            "host,test_type\n  ,TestType.SERDES_PRBS\n",
        );
        assert_eq!(metadata.hostname, None);
    }

    #[test]
    fn unreadable_file_never_panics() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing_v1_2_3_prbs_test.csv");
        let metadata = Classifier::new().classify(&path);
        assert_eq!(metadata.hostname, None);
        // Filename-derived fields still work without readable content.
        assert_eq!(metadata.firmware.as_deref(), Some("v1_2_3"));
        assert_eq!(metadata.kind, Some(TestKind::Prbs));
    }

    #[test]
    fn header_only_file_has_no_hostname_or_content_kind() {
        let metadata = classify_file(
            "SYS1_erisc_v1_7_103_run.csv",
            "host,test_type\n",
        );
        assert_eq!(metadata.hostname, None);
        assert_eq!(metadata.kind, None);
    }

    #[test]
    fn kind_labels_and_sheets_are_paired() {
        assert_eq!(TestKind::Prbs.as_str(), "PRBS");
        assert_eq!(TestKind::Data.as_str(), "DATA");
        assert_eq!(TestKind::Prbs.raw_sheet(), "raw prbs data");
        assert_eq!(TestKind::Data.summary_sheet(), "DATA Summary");
    }
}
