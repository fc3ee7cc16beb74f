//! Worksheet part rendering.
//!
//! A populated raw-data sheet is rendered from scratch, so replacing the
//! part is also the full-range reset of whatever the template shipped.

use quick_xml::escape::escape;

use crate::table::{Cell, Table};
use crate::types::CellRangeRef;

/// Rectangular extent of written cells, anchored at `A1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrittenExtent {
    /// 1-based last written row (headers count as row 1).
    pub last_row: usize,
    /// 1-based last written column.
    pub last_col: usize,
}

impl WrittenExtent {
    /// The extent as an `A1:{col}{row}` range reference.
    pub fn range_ref(&self) -> CellRangeRef {
        format!("A1:{}{}", column_letter(self.last_col), self.last_row)
    }
}

/// Render a table into a complete worksheet part.
///
/// Row 1 holds the column headers coerced to text; data rows start at row 2
/// in table order. Null values become explicit empty cells, never the text
/// of a missing-value sentinel.
pub fn render_worksheet(table: &Table) -> (Vec<u8>, WrittenExtent) {
    let extent = WrittenExtent {
        last_row: table.row_count() + 1,
        last_col: table.column_count().max(1),
    };

    let mut xml = String::with_capacity(table.row_count() * table.column_count() * 24 + 512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    xml.push_str(&format!(r#"<dimension ref="{}"/>"#, extent.range_ref()));
    xml.push_str("<sheetData>");

    xml.push_str(r#"<row r="1">"#);
    for (col_idx, header) in table.columns().iter().enumerate() {
        push_text_cell(&mut xml, 1, col_idx + 1, header);
    }
    xml.push_str("</row>");

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = row_idx + 2;
        xml.push_str(&format!(r#"<row r="{row_num}">"#));
        for (col_idx, cell) in row.iter().enumerate() {
            push_cell(&mut xml, row_num, col_idx + 1, cell);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    (xml.into_bytes(), extent)
}

/// 1-based column index to spreadsheet letters: 1 -> `A`, 27 -> `AA`.
pub fn column_letter(mut index: usize) -> String {
    debug_assert!(index >= 1);
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).expect("column letters are ascii")
}

fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_letter(col), row)
}

fn push_cell(xml: &mut String, row: usize, col: usize, cell: &Cell) {
    match cell {
        Cell::Null => {
            // Explicit empty cell: keeps the grid rectangular without ever
            // rendering a missing-value sentinel as text.
            xml.push_str(&format!(r#"<c r="{}"/>"#, cell_ref(row, col)));
        }
        Cell::Bool(value) => {
            xml.push_str(&format!(
                r#"<c r="{}" t="b"><v>{}</v></c>"#,
                cell_ref(row, col),
                if *value { 1 } else { 0 }
            ));
        }
        Cell::Int(value) => {
            xml.push_str(&format!(
                r#"<c r="{}"><v>{}</v></c>"#,
                cell_ref(row, col),
                value
            ));
        }
        Cell::Float(value) => {
            xml.push_str(&format!(
                r#"<c r="{}"><v>{}</v></c>"#,
                cell_ref(row, col),
                value
            ));
        }
        Cell::Text(value) => push_text_cell(xml, row, col, value),
    }
}

fn push_text_cell(xml: &mut String, row: usize, col: usize, text: &str) {
    xml.push_str(&format!(
        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        cell_ref(row, col),
        escape(text)
    ));
}
