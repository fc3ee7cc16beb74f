/// System hostname extracted from a CSV `host` column.
/// Example: `bh-glx-b02u02`
pub type Hostname = String;
/// Firmware version token extracted from a filename.
/// Examples: `erisc_v1_7_103`, `v2_0_14`
pub type FirmwareVersion = String;
/// Worksheet name inside the template workbook.
/// Examples: `raw prbs data`, `PRBS Summary`
pub type SheetName = String;
/// Zip-internal part name inside an xlsx package.
/// Example: `xl/worksheets/sheet2.xml`
pub type PartName = String;
/// A1-style rectangular range reference.
/// Example: `A1:H42`
pub type CellRangeRef = String;
/// Column header text in a compiled table.
/// Examples: `host`, `lane`, `ber`
pub type ColumnName = String;
