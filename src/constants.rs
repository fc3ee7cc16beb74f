/// Constants used by per-file classification.
pub mod classify {
    /// `test_type` column value identifying a PRBS run.
    pub const TEST_TYPE_PRBS_VALUE: &str = "TestType.SERDES_PRBS";
    /// `test_type` column value identifying a packet-data run.
    pub const TEST_TYPE_DATA_VALUE: &str = "TestType.SIMPLE_PACKET";
    /// Column holding the system hostname in each result file.
    pub const HOST_COLUMN: &str = "host";
    /// Column holding the test-type discriminator in each result file.
    pub const TEST_TYPE_COLUMN: &str = "test_type";
    /// Filename marker used as the PRBS fallback when content is unusable.
    pub const FILENAME_MARKER_PRBS: &str = "prbs_test";
    /// Filename marker used as the DATA fallback when content is unusable.
    pub const FILENAME_MARKER_DATA: &str = "data_test";
    /// Firmware pattern with the build prefix, matched first.
    pub const FIRMWARE_PATTERN_PREFIXED: &str = r"erisc_v\d+[._]\d+[._]\d+";
    /// Bare firmware pattern, matched when the prefixed form is absent.
    pub const FIRMWARE_PATTERN_BARE: &str = r"v\d+[._]\d+[._]\d+";
    /// Log message used when an unclassifiable file is dropped.
    pub const SKIP_UNCLASSIFIED_MSG: &str = "skipping unclassifiable csv file";
}

/// Constants naming the fixed sheets of the template workbook.
pub mod sheets {
    /// Raw-data sheet receiving compiled PRBS rows.
    pub const RAW_PRBS: &str = "raw prbs data";
    /// Raw-data sheet receiving compiled packet-data rows.
    pub const RAW_DATA: &str = "raw data";
    /// Summary sheet whose pivots read from the PRBS raw sheet.
    pub const PRBS_SUMMARY: &str = "PRBS Summary";
    /// Summary sheet whose pivots read from the packet-data raw sheet.
    pub const DATA_SUMMARY: &str = "DATA Summary";
}

/// Constants used by report naming and driver defaults.
pub mod report {
    /// Extension of emitted report files.
    pub const OUTPUT_EXTENSION: &str = "xlsx";
    /// Extension of input result files (matched case-insensitively).
    pub const INPUT_EXTENSION: &str = "csv";
    /// Default directory scanned for input files.
    pub const DEFAULT_DATA_DIR: &str = "data";
    /// Default template workbook path.
    pub const DEFAULT_TEMPLATE_PATH: &str = "system_data_template.xlsx";
    /// Default directory receiving emitted reports.
    pub const DEFAULT_OUTPUT_DIR: &str = "summaries";
}

/// Constants tied to the xlsx package layout.
pub mod package {
    /// Part describing the workbook's sheet list.
    pub const WORKBOOK_PART: &str = "xl/workbook.xml";
    /// Relationship part resolving workbook sheet ids to worksheet parts.
    pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
    /// Relationship type marking a pivot-table part.
    pub const PIVOT_TABLE_REL_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/pivotTable";
    /// Relationship type marking a pivot-cache-definition part.
    pub const PIVOT_CACHE_REL_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/pivotCacheDefinition";
}
