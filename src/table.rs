use std::path::Path;

use crate::errors::ReportError;
use crate::types::ColumnName;

/// A single typed value parsed from a CSV field.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Missing value (empty CSV field or padded-in column).
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// True when the cell carries no value.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// An in-memory table with ordered columns and ordered rows.
///
/// Rows always have exactly `columns.len()` cells; constructors and
/// concatenation maintain that invariant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<ColumnName>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from a header and row set.
    pub fn new(columns: Vec<ColumnName>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Ordered column headers.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Ordered data rows.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Read a whole CSV file into a [`Table`], inferring cell types per field.
pub fn read_csv_table(path: &Path) -> Result<Table, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let columns: Vec<ColumnName> = reader
        .headers()?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = (0..columns.len())
            .map(|idx| parse_cell(record.get(idx).unwrap_or_default()))
            .collect();
        rows.push(row);
    }
    Ok(Table::new(columns, rows))
}

/// Concatenate tables by stacking rows under the shared column union.
///
/// Column order is the first table's header followed by later-seen columns in
/// first-appearance order. Rows lacking a column are padded with [`Cell::Null`].
/// Row order within and across tables is preserved; row identity is not.
pub fn concat_tables(tables: Vec<Table>) -> Table {
    let mut columns: Vec<ColumnName> = Vec::new();
    for table in &tables {
        for column in table.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for table in tables {
        // Map the union layout onto this table's own column positions once.
        let layout: Vec<Option<usize>> = columns
            .iter()
            .map(|column| table.column_index(column))
            .collect();
        for row in table.rows {
            let merged = layout
                .iter()
                .map(|slot| match slot {
                    Some(idx) => row.get(*idx).cloned().unwrap_or(Cell::Null),
                    None => Cell::Null,
                })
                .collect();
            rows.push(merged);
        }
    }
    Table::new(columns, rows)
}

fn parse_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Cell::Int(value);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        // "nan"/"inf" parse as floats; neither is storable in a sheet cell.
        return if value.is_finite() {
            Cell::Float(value)
        } else {
            Cell::Null
        };
    }
    if let Ok(value) = trimmed.parse::<bool>() {
        return Cell::Bool(value);
    }
    Cell::Text(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parse_cell_infers_types() {
        assert_eq!(parse_cell(""), Cell::Null);
        assert_eq!(parse_cell("  "), Cell::Null);
        assert_eq!(parse_cell("42"), Cell::Int(42));
        assert_eq!(parse_cell("-3.5"), Cell::Float(-3.5));
        assert_eq!(parse_cell("true"), Cell::Bool(true));
        assert_eq!(parse_cell("bh-glx-b02u02"), Cell::Text("bh-glx-b02u02".to_string()));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(parse_cell("nan"), Cell::Null);
        assert_eq!(parse_cell("NaN"), Cell::Null);
        assert_eq!(parse_cell("inf"), Cell::Null);
    }

    #[test]
    fn read_csv_table_preserves_shape_and_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sample.csv");
        fs::write(&path, "host,lane,ber\nh1,0,1e-12\nh1,1,\n").unwrap();

        let table = read_csv_table(&path).unwrap();
        assert_eq!(table.columns(), &["host", "lane", "ber"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][1], Cell::Int(0));
        assert_eq!(table.rows()[1][2], Cell::Null);
    }

    #[test]
    fn read_csv_table_with_headers_only_is_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.csv");
        fs::write(&path, "host,lane\n").unwrap();

        let table = read_csv_table(&path).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn concat_doubles_rows_without_dedup() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Int(1), Cell::Int(2)], vec![Cell::Int(3), Cell::Int(4)]],
        );
        let single = concat_tables(vec![table.clone()]);
        let double = concat_tables(vec![table.clone(), table]);
        assert_eq!(double.row_count(), 2 * single.row_count());
        assert_eq!(double.rows()[0], double.rows()[2]);
    }

    #[test]
    fn concat_unions_columns_and_pads_with_null() {
        let first = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Int(1), Cell::Int(2)]],
        );
        let second = Table::new(
            vec!["b".to_string(), "c".to_string()],
            vec![vec![Cell::Int(20), Cell::Int(30)]],
        );

        let merged = concat_tables(vec![first, second]);
        assert_eq!(merged.columns(), &["a", "b", "c"]);
        assert_eq!(merged.rows()[0], vec![Cell::Int(1), Cell::Int(2), Cell::Null]);
        assert_eq!(merged.rows()[1], vec![Cell::Null, Cell::Int(20), Cell::Int(30)]);
    }

    #[test]
    fn concat_of_nothing_is_empty() {
        let merged = concat_tables(Vec::new());
        assert!(merged.is_empty());
        assert_eq!(merged.column_count(), 0);
    }
}
