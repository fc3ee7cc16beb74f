use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::classify::Classifier;
use crate::compile::compile_bucket;
use crate::config::ReportConfig;
use crate::constants::report::INPUT_EXTENSION;
use crate::errors::ReportError;
use crate::group::{BucketMap, group_files};
use crate::types::Hostname;
use crate::workbook::TemplatePopulator;

/// Final tally of one report run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    /// Buckets the driver attempted to process.
    pub attempted: usize,
    /// Buckets that produced a saved report workbook.
    pub succeeded: usize,
    /// Buckets that failed, including buckets with no usable data.
    pub failed: usize,
    /// Requested hostnames that matched no bucket.
    pub unmatched_hosts: Vec<Hostname>,
}

/// Orchestrates scan, classification, grouping, compilation, and population.
pub struct ReportDriver {
    config: ReportConfig,
    classifier: Classifier,
    populator: TemplatePopulator,
}

impl ReportDriver {
    /// Create a driver from a validated configuration.
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        let populator = TemplatePopulator::new(&config);
        Ok(Self {
            config,
            classifier: Classifier::new(),
            populator,
        })
    }

    /// Process every bucket (or the filtered subset) into report workbooks.
    ///
    /// Per-bucket failures are tallied and never abort the run; only the
    /// three run-level emptiness conditions return an error.
    pub fn run(&self) -> Result<RunSummary, ReportError> {
        let files = scan_csv_files(&self.config.data_dir);
        if files.is_empty() {
            return Err(ReportError::NoInputFiles(self.config.data_dir.clone()));
        }
        info!(
            count = files.len(),
            dir = %self.config.data_dir.display(),
            "found csv files"
        );

        let classified = files.iter().map(|path| self.classifier.classify(path));
        let mut buckets = group_files(classified);
        if buckets.is_empty() {
            return Err(ReportError::NoBuckets);
        }

        let unmatched_hosts = self.apply_host_filter(&mut buckets)?;

        let mut summary = RunSummary::default();
        for (key, bucket) in &buckets {
            summary.attempted += 1;
            info!(key = %key, "processing system and firmware combination");

            let compiled = compile_bucket(bucket);
            if compiled.is_empty() {
                warn!(key = %key, "no usable data for bucket, skipping");
                summary.failed += 1;
                continue;
            }

            match self.populator.populate(key, &compiled) {
                Ok(_) => summary.succeeded += 1,
                Err(err) => {
                    error!(key = %key, error = %err, "failed to generate report");
                    summary.failed += 1;
                }
            }
        }

        for host in &unmatched_hosts {
            warn!(host = %host, "no data found for requested system");
        }
        summary.unmatched_hosts = unmatched_hosts;
        Ok(summary)
    }

    /// Drop buckets outside the host filter; report which hosts found
    /// nothing. An empty filter keeps everything.
    fn apply_host_filter(&self, buckets: &mut BucketMap) -> Result<Vec<Hostname>, ReportError> {
        if self.config.host_filter.is_empty() {
            info!(buckets = buckets.len(), "processing all system and firmware combinations");
            return Ok(Vec::new());
        }

        let wanted: HashSet<&str> = self
            .config
            .host_filter
            .iter()
            .map(String::as_str)
            .collect();
        buckets.retain(|key, _| wanted.contains(key.hostname.as_str()));
        if buckets.is_empty() {
            return Err(ReportError::HostFilterUnmatched(
                self.config.host_filter.join(", "),
            ));
        }

        let found: HashSet<&str> = buckets
            .keys()
            .map(|key| key.hostname.as_str())
            .collect();
        let unmatched = self
            .config
            .host_filter
            .iter()
            .filter(|host| !found.contains(host.as_str()))
            .cloned()
            .collect();
        info!(buckets = buckets.len(), "filtered to requested systems");
        Ok(unmatched)
    }
}

/// List `*.csv` files directly under `dir`, sorted by path.
///
/// The flat sorted listing keeps grouping (and therefore bucket iteration)
/// reproducible across runs and filesystems.
pub fn scan_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "data directory does not exist");
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}
