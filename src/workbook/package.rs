//! Raw access to the xlsx zip container.
//!
//! The template is treated as an ordered set of named parts. Population
//! replaces whole parts and rewrites the archive; every untouched part
//! (styles, shared strings, cached pivot records) round-trips byte for byte.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::Path;

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::constants::package::{WORKBOOK_PART, WORKBOOK_RELS_PART};
use crate::errors::ReportError;
use crate::types::{PartName, SheetName};

/// One entry of a `.rels` part.
#[derive(Clone, Debug)]
pub struct Relationship {
    /// Relationship id (`rId3`).
    pub id: String,
    /// Fully qualified relationship type URI.
    pub rel_type: String,
    /// Target path, relative to the owning part's directory.
    pub target: String,
}

/// An xlsx workbook held as its ordered zip parts.
pub struct XlsxPackage {
    parts: IndexMap<PartName, Vec<u8>>,
}

impl XlsxPackage {
    /// Read every part of the archive at `path` into memory.
    pub fn open(path: &Path) -> Result<Self, ReportError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut parts = IndexMap::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            parts.insert(name, bytes);
        }
        Ok(Self { parts })
    }

    /// Bytes of a named part, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Replace (or add) a part's bytes.
    pub fn set_part(&mut self, name: impl Into<PartName>, bytes: Vec<u8>) {
        self.parts.insert(name.into(), bytes);
    }

    /// Write the archive to `path`, keeping the original part order.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(bytes)?;
        }
        writer.finish()?;
        Ok(())
    }

    /// Relationships of a `.rels` part; a missing part reads as empty.
    pub fn relationships(&self, rels_part: &str) -> Result<Vec<Relationship>, ReportError> {
        match self.part(rels_part) {
            Some(xml) => parse_relationships(xml),
            None => Ok(Vec::new()),
        }
    }

    /// Resolve a sheet name to its worksheet part via the workbook part and
    /// its relationships. `Ok(None)` means the workbook has no such sheet.
    pub fn sheet_part(&self, sheet_name: &str) -> Result<Option<PartName>, ReportError> {
        let workbook = self
            .part(WORKBOOK_PART)
            .ok_or_else(|| ReportError::Xml(format!("package lacks '{WORKBOOK_PART}'")))?;
        let Some(rel_id) = sheet_relationship_id(workbook, sheet_name)? else {
            return Ok(None);
        };
        let target = self
            .relationships(WORKBOOK_RELS_PART)?
            .into_iter()
            .find(|rel| rel.id == rel_id)
            .map(|rel| resolve_target(WORKBOOK_PART, &rel.target));
        Ok(target)
    }
}

/// Compute the `.rels` part owning relationship entries for `part`.
///
/// Example: `xl/pivotTables/pivotTable1.xml` ->
/// `xl/pivotTables/_rels/pivotTable1.xml.rels`.
pub fn rels_part_for(part: &str) -> PartName {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the directory of its owning part.
pub fn resolve_target(owning_part: &str, target: &str) -> PartName {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = owning_part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, ReportError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) | Ok(Event::Empty(element))
                if element.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut rel_type = None;
                let mut target = None;
                for attribute in element.attributes() {
                    let attribute =
                        attribute.map_err(|err| ReportError::Xml(err.to_string()))?;
                    let value = attribute
                        .unescape_value()
                        .map_err(|err| ReportError::Xml(err.to_string()))?
                        .into_owned();
                    match attribute.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Type" => rel_type = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                    relationships.push(Relationship {
                        id,
                        rel_type,
                        target,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(ReportError::Xml(err.to_string())),
        }
        buf.clear();
    }
    Ok(relationships)
}

/// Find the `r:id` of a named `<sheet>` in the workbook part.
fn sheet_relationship_id(
    workbook_xml: &[u8],
    sheet_name: &str,
) -> Result<Option<String>, ReportError> {
    let mut reader = Reader::from_reader(workbook_xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) | Ok(Event::Empty(element))
                if element.local_name().as_ref() == b"sheet" =>
            {
                let mut name = None;
                let mut rel_id = None;
                for attribute in element.attributes() {
                    let attribute =
                        attribute.map_err(|err| ReportError::Xml(err.to_string()))?;
                    let value = attribute
                        .unescape_value()
                        .map_err(|err| ReportError::Xml(err.to_string()))?
                        .into_owned();
                    match attribute.key.as_ref() {
                        b"name" => name = Some(value),
                        b"r:id" => rel_id = Some(value),
                        _ => {}
                    }
                }
                if name.as_deref() == Some(sheet_name) {
                    return Ok(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(ReportError::Xml(err.to_string())),
        }
        buf.clear();
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rels_part_paths_are_derived_from_the_owning_part() {
        assert_eq!(
            rels_part_for("xl/worksheets/sheet2.xml"),
            "xl/worksheets/_rels/sheet2.xml.rels"
        );
        assert_eq!(rels_part_for("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
    }

    #[test]
    fn targets_resolve_relative_to_the_owning_directory() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target(
                "xl/pivotTables/pivotTable1.xml",
                "../pivotCache/pivotCacheDefinition1.xml"
            ),
            "xl/pivotCache/pivotCacheDefinition1.xml"
        );
        assert_eq!(resolve_target("xl/workbook.xml", "/xl/styles.xml"), "xl/styles.xml");
    }

    #[test]
    fn relationships_parse_ids_types_and_targets() {
        let xml = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://example.com/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://example.com/styles" Target="styles.xml"/>
</Relationships>"#;
        let relationships = parse_relationships(xml).unwrap();
        assert_eq!(relationships.len(), 2);
        assert_eq!(relationships[0].id, "rId1");
        assert_eq!(relationships[1].target, "styles.xml");
    }

    #[test]
    fn sheet_lookup_matches_by_name() {
        let xml = br#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
  <sheet name="raw prbs data" sheetId="1" r:id="rId1"/>
  <sheet name="PRBS Summary" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;
        assert_eq!(
            sheet_relationship_id(xml, &"PRBS Summary".to_string()).unwrap(),
            Some("rId2".to_string())
        );
        assert_eq!(sheet_relationship_id(xml, &"nope".to_string()).unwrap(), None);
    }
}
