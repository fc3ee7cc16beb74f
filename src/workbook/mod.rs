//! Template workbook population.
//!
//! One call per bucket: load a fresh copy of the template, overwrite the
//! raw-data sheet for each compiled kind, rebind the matching summary
//! pivots, and save under the bucket's deterministic name. The template on
//! disk is never mutated and no workbook state is shared between buckets.

/// Raw xlsx part container and relationship resolution.
pub mod package;
/// Pivot-cache data-source rebinding.
pub mod pivot;
/// Worksheet part rendering.
pub mod sheet;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::classify::{ALL_KINDS, TestKind};
use crate::compile::CompiledBucket;
use crate::config::ReportConfig;
use crate::constants::report::OUTPUT_EXTENSION;
use crate::errors::ReportError;
use crate::group::GroupKey;
use crate::table::Table;
use crate::workbook::package::XlsxPackage;
use crate::workbook::pivot::rebind_pivot_sources;
use crate::workbook::sheet::render_worksheet;

/// Writes one report workbook per bucket from the fixed template.
pub struct TemplatePopulator {
    template_path: PathBuf,
    output_dir: PathBuf,
}

impl TemplatePopulator {
    /// Create a populator bound to the run's template and output directory.
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            template_path: config.template_path.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    /// Output path for a bucket: `{hostname}_{firmware}.xlsx`.
    pub fn output_path(&self, key: &GroupKey) -> PathBuf {
        self.output_dir.join(format!("{key}.{OUTPUT_EXTENSION}"))
    }

    /// Populate the template with a bucket's compiled tables and save it.
    ///
    /// A kind with no compiled table (or an empty one) leaves its sheets
    /// untouched. Template load problems, a missing raw-data sheet, and
    /// save failures all fail this bucket only; the caller decides what
    /// that means for the run.
    pub fn populate(
        &self,
        key: &GroupKey,
        compiled: &CompiledBucket,
    ) -> Result<PathBuf, ReportError> {
        let mut package = load_template(&self.template_path)?;

        for kind in ALL_KINDS {
            match compiled.table(kind) {
                Some(table) if !table.is_empty() => {
                    populate_kind(&mut package, kind, table)?;
                }
                _ => {
                    debug!(key = %key, kind = kind.as_str(), "no compiled data for kind");
                }
            }
        }

        let output_path = self.output_path(key);
        package.save(&output_path)?;
        info!(path = %output_path.display(), "saved report workbook");
        Ok(output_path)
    }
}

fn load_template(path: &Path) -> Result<XlsxPackage, ReportError> {
    XlsxPackage::open(path).map_err(|err| ReportError::Template {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn populate_kind(
    package: &mut XlsxPackage,
    kind: TestKind,
    table: &Table,
) -> Result<(), ReportError> {
    let raw_sheet = kind.raw_sheet();
    let Some(raw_part) = package.sheet_part(&raw_sheet)? else {
        return Err(ReportError::MissingSheet(raw_sheet));
    };

    let (xml, extent) = render_worksheet(table);
    package.set_part(raw_part, xml);
    info!(
        sheet = %raw_sheet,
        rows = table.row_count(),
        range = %extent.range_ref(),
        "wrote compiled table to raw sheet"
    );

    rebind_pivot_sources(package, &kind.summary_sheet(), &raw_sheet, &extent.range_ref())?;
    Ok(())
}
