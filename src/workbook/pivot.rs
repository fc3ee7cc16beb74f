//! Pivot-cache data-source rebinding.
//!
//! The only thing the rest of the crate may ask of a pivot table is "point
//! your cached worksheet-range source at this sheet and range". Everything
//! about how pivots are stored (pivot-table parts hanging off a summary
//! sheet's relationships, each referencing a pivot-cache definition) stays
//! behind this module.

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{info, warn};

use crate::constants::package::{PIVOT_CACHE_REL_TYPE, PIVOT_TABLE_REL_TYPE};
use crate::errors::ReportError;
use crate::types::{CellRangeRef, PartName, SheetName};
use crate::workbook::package::{XlsxPackage, rels_part_for, resolve_target};

/// Rebind every worksheet-range pivot source on `summary_sheet` to
/// `data_sheet` and `range`. Returns how many caches were updated.
///
/// A template without the summary sheet, or a summary sheet without pivot
/// tables, is logged and skipped rather than treated as an error.
pub fn rebind_pivot_sources(
    package: &mut XlsxPackage,
    summary_sheet: &SheetName,
    data_sheet: &SheetName,
    range: &CellRangeRef,
) -> Result<usize, ReportError> {
    let Some(summary_part) = package.sheet_part(summary_sheet)? else {
        warn!(sheet = %summary_sheet, "summary sheet not in template, skipping pivot rebind");
        return Ok(0);
    };

    let pivot_parts: Vec<PartName> = package
        .relationships(&rels_part_for(&summary_part))?
        .into_iter()
        .filter(|rel| rel.rel_type == PIVOT_TABLE_REL_TYPE)
        .map(|rel| resolve_target(&summary_part, &rel.target))
        .collect();
    if pivot_parts.is_empty() {
        warn!(sheet = %summary_sheet, "no pivot tables on summary sheet");
        return Ok(0);
    }

    let mut updated = 0;
    for pivot_part in pivot_parts {
        for rel in package.relationships(&rels_part_for(&pivot_part))? {
            if rel.rel_type != PIVOT_CACHE_REL_TYPE {
                continue;
            }
            let cache_part = resolve_target(&pivot_part, &rel.target);
            let Some(xml) = package.part(&cache_part) else {
                warn!(part = %cache_part, "pivot cache part missing from package");
                continue;
            };
            let (patched, changed) = patch_worksheet_source(xml, data_sheet, range)?;
            if changed {
                info!(
                    part = %cache_part,
                    sheet = %data_sheet,
                    range = %range,
                    "rebound pivot cache source"
                );
                package.set_part(cache_part, patched);
                updated += 1;
            }
        }
    }
    if updated == 0 {
        warn!(sheet = %summary_sheet, "no worksheet-range pivot sources to update");
    }
    Ok(updated)
}

/// Rewrite each `worksheetSource` element carrying a range reference so its
/// `sheet`/`ref` attributes name the fresh data. Named-range and external
/// sources (no `ref` attribute) pass through untouched.
fn patch_worksheet_source(
    xml: &[u8],
    data_sheet: &SheetName,
    range: &CellRangeRef,
) -> Result<(Vec<u8>, bool), ReportError> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut changed = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(element)) if element.local_name().as_ref() == b"worksheetSource" => {
                match rebound_element(&element, data_sheet, range)? {
                    Some(rebound) => {
                        writer.write_event(Event::Empty(rebound))?;
                        changed = true;
                    }
                    None => writer.write_event(Event::Empty(element))?,
                }
            }
            Ok(Event::Start(element)) if element.local_name().as_ref() == b"worksheetSource" => {
                match rebound_element(&element, data_sheet, range)? {
                    Some(rebound) => {
                        writer.write_event(Event::Start(rebound))?;
                        changed = true;
                    }
                    None => writer.write_event(Event::Start(element))?,
                }
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(err) => return Err(ReportError::Xml(err.to_string())),
        }
        buf.clear();
    }
    Ok((writer.into_inner().into_inner(), changed))
}

fn rebound_element(
    element: &BytesStart<'_>,
    data_sheet: &SheetName,
    range: &CellRangeRef,
) -> Result<Option<BytesStart<'static>>, ReportError> {
    let mut kept = Vec::new();
    let mut has_range = false;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|err| ReportError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        match key.as_str() {
            "ref" => has_range = true,
            "sheet" => {}
            _ => {
                let value = attribute
                    .unescape_value()
                    .map_err(|err| ReportError::Xml(err.to_string()))?
                    .into_owned();
                kept.push((key, value));
            }
        }
    }
    if !has_range {
        return Ok(None);
    }

    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut rebound = BytesStart::new(name);
    rebound.push_attribute(("ref", range.as_str()));
    rebound.push_attribute(("sheet", data_sheet.as_str()));
    for (key, value) in &kept {
        rebound.push_attribute((key.as_str(), value.as_str()));
    }
    Ok(Some(rebound))
}
