use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::classify::{FileMetadata, TestKind};
use crate::constants::classify::SKIP_UNCLASSIFIED_MSG;
use crate::types::{FirmwareVersion, Hostname};

/// Identity of one output report: a hostname plus firmware version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    /// System the report covers.
    pub hostname: Hostname,
    /// Firmware version the report covers.
    pub firmware: FirmwareVersion,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.hostname, self.firmware)
    }
}

/// Ordered per-kind file lists sharing one [`GroupKey`].
///
/// Append order is input-scan order; the bucket is immutable once grouping
/// completes and is consumed exactly once by the compiler.
#[derive(Clone, Debug, Default)]
pub struct Bucket {
    prbs: Vec<PathBuf>,
    data: Vec<PathBuf>,
}

impl Bucket {
    /// Append a file to the given kind's list.
    pub fn push(&mut self, kind: TestKind, path: PathBuf) {
        match kind {
            TestKind::Prbs => self.prbs.push(path),
            TestKind::Data => self.data.push(path),
        }
    }

    /// Files recorded for one kind, in append order.
    pub fn files(&self, kind: TestKind) -> &[PathBuf] {
        match kind {
            TestKind::Prbs => &self.prbs,
            TestKind::Data => &self.data,
        }
    }

    /// True when no kind holds any file.
    pub fn is_empty(&self) -> bool {
        self.prbs.is_empty() && self.data.is_empty()
    }
}

/// Map from grouping key to bucket, in first-seen key order.
pub type BucketMap = IndexMap<GroupKey, Bucket>;

/// Partition classified files into buckets keyed by `(hostname, firmware)`.
///
/// Files with any absent field are dropped with a warning. Duplicate paths
/// are kept; deduplication is intentionally not performed.
pub fn group_files(classified: impl IntoIterator<Item = FileMetadata>) -> BucketMap {
    let mut buckets = BucketMap::new();
    for metadata in classified {
        let (Some(hostname), Some(firmware), Some(kind)) = (
            metadata.hostname.clone(),
            metadata.firmware.clone(),
            metadata.kind,
        ) else {
            warn!(
                path = %metadata.path.display(),
                hostname = metadata.hostname.is_some(),
                firmware = metadata.firmware.is_some(),
                kind = metadata.kind.is_some(),
                SKIP_UNCLASSIFIED_MSG
            );
            continue;
        };
        let key = GroupKey { hostname, firmware };
        debug!(
            path = %metadata.path.display(),
            key = %key,
            kind = kind.as_str(),
            "grouped csv file"
        );
        buckets.entry(key).or_default().push(kind, metadata.path);
    }
    buckets
}
