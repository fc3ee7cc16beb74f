use std::path::PathBuf;

use crate::constants::report::{DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_PATH};
use crate::errors::ReportError;
use crate::types::Hostname;

/// Top-level report-run configuration.
///
/// Built once in the binary and passed into each component, so nothing in
/// the pipeline reads process-wide state.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Directory scanned (non-recursively) for input CSV files.
    pub data_dir: PathBuf,
    /// Path to the template workbook loaded fresh for every bucket.
    pub template_path: PathBuf,
    /// Directory receiving one report workbook per bucket.
    pub output_dir: PathBuf,
    /// Hostnames to restrict processing to; empty means every bucket.
    pub host_filter: Vec<Hostname>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            host_filter: Vec::new(),
        }
    }
}

impl ReportConfig {
    /// Create a configuration with explicit directories and template path.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            template_path: template_path.into(),
            output_dir: output_dir.into(),
            host_filter: Vec::new(),
        }
    }

    /// Restrict processing to the given hostnames.
    pub fn with_host_filter(mut self, hosts: Vec<Hostname>) -> Self {
        self.host_filter = hosts;
        self
    }

    /// Validate required fields, naming everything that is missing.
    pub fn validate(&self) -> Result<(), ReportError> {
        let mut missing = Vec::new();
        if self.data_dir.as_os_str().is_empty() {
            missing.push("data_dir");
        }
        if self.template_path.as_os_str().is_empty() {
            missing.push("template_path");
        }
        if self.output_dir.as_os_str().is_empty() {
            missing.push("output_dir");
        }
        if !missing.is_empty() {
            return Err(ReportError::Configuration(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )));
        }
        if self.host_filter.iter().any(|host| host.trim().is_empty()) {
            return Err(ReportError::Configuration(
                "host filter entries must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ReportConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_paths_are_named_in_the_error() {
        let config = ReportConfig::new("", "", "out");
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("data_dir"));
        assert!(message.contains("template_path"));
        assert!(!message.contains("output_dir"));
    }

    #[test]
    fn blank_filter_entries_are_rejected() {
        let config = ReportConfig::default().with_host_filter(vec!["  ".to_string()]);
        assert!(config.validate().is_err());
    }
}
