//! The OPC package: a zip archive of named parts.
//!
//! Parts are held in memory (presentations are small), edited through the
//! presentation model and written back as a fresh archive.

use crate::constants::{CONTENT_TYPES_PART, NS_CONTENT_TYPES};
use crate::rels::{rels_part_name, resolve_target, Relationships};
use crate::xml::XmlElement;
use deck_core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// `[Content_Types].xml`: content type by extension and by part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse `[Content_Types].xml`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = XmlElement::parse_bytes(bytes)?;
        let mut types = Self::default();

        for element in root.elements() {
            let content_type = element.attr("ContentType").unwrap_or_default().to_string();
            match element.local_name() {
                "Default" => {
                    if let Some(ext) = element.attr("Extension") {
                        types.defaults.push((ext.to_string(), content_type));
                    }
                }
                "Override" => {
                    if let Some(part) = element.attr("PartName") {
                        types
                            .overrides
                            .push((part.trim_start_matches('/').to_string(), content_type));
                    }
                }
                _ => {}
            }
        }

        Ok(types)
    }

    /// Serialize to `[Content_Types].xml`.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Types").with_attr("xmlns", NS_CONTENT_TYPES);
        for (ext, content_type) in &self.defaults {
            root.push(
                XmlElement::new("Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", content_type.as_str()),
            );
        }
        for (part, content_type) in &self.overrides {
            root.push(
                XmlElement::new("Override")
                    .with_attr("PartName", format!("/{}", part))
                    .with_attr("ContentType", content_type.as_str()),
            );
        }
        root.to_xml()
    }

    /// Register a default content type for an extension.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if !self.defaults.iter().any(|(e, _)| e.eq_ignore_ascii_case(extension)) {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Register (or replace) the content type of one part.
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        self.remove_override(part);
        self.overrides
            .push((part.to_string(), content_type.to_string()));
    }

    /// Drop the override of one part; returns whether one existed.
    pub fn remove_override(&mut self, part: &str) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|(p, _)| p != part);
        before != self.overrides.len()
    }

    /// Content type of a part, by override first and extension second.
    pub fn content_type(&self, part: &str) -> Option<&str> {
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| p == part) {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }
}

/// All parts of a package, keyed by part name (zip entry name).
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a package from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        Self::from_reader(Cursor::new(data))
    }

    /// Read a package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Read a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.insert(name, data);
        }

        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(Error::CorruptedFile(
                "package has no [Content_Types].xml".to_string(),
            ));
        }

        Ok(Self { parts })
    }

    /// Write the package as a zip archive, content types first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        // Fixed timestamps keep the archive reproducible.
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let ordered = self
            .parts
            .get_key_value(CONTENT_TYPES_PART)
            .into_iter()
            .chain(self.parts.iter().filter(|(name, _)| *name != CONTENT_TYPES_PART));

        for (name, data) in ordered {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(data)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Bytes of a part that must exist.
    pub fn require_part(&self, name: &str) -> Result<&[u8]> {
        self.part(name)
            .ok_or_else(|| Error::PptxParseError(format!("missing part '{}'", name)))
    }

    /// Insert or replace a part.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.parts.insert(name.into(), data);
    }

    /// Remove a part, returning its bytes.
    pub fn remove_part(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Part names in sorted order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Parsed relationships of `part`; empty if it has none.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        match self.part(&rels_part_name(part)) {
            Some(bytes) => Relationships::parse(bytes),
            None => Ok(Relationships::new()),
        }
    }

    /// Parsed content types.
    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::parse(self.require_part(CONTENT_TYPES_PART)?)
    }

    /// Drop every part no relationship chain from the package root reaches,
    /// together with its relationship part and content-type override.
    /// Returns the names of the removed parts.
    pub fn prune_unreachable(&mut self) -> Result<Vec<String>> {
        let mut reachable = BTreeSet::new();
        let mut pending = vec![String::new()];

        while let Some(source) = pending.pop() {
            for rel in self.relationships(&source)?.iter() {
                if rel.is_external() {
                    continue;
                }
                let target = resolve_target(&source, &rel.target)?;
                if self.contains(&target) && reachable.insert(target.clone()) {
                    pending.push(target);
                }
            }
        }

        let removed: Vec<String> = self
            .parts
            .keys()
            .filter(|name| {
                name.as_str() != CONTENT_TYPES_PART
                    && !reachable.contains(name.as_str())
                    && !is_rels_of_reachable(name, &reachable)
            })
            .cloned()
            .collect();

        if removed.is_empty() {
            return Ok(removed);
        }

        let mut content_types = self.content_types()?;
        for name in &removed {
            self.remove_part(name);
            content_types.remove_override(name);
            log::debug!("Dropped unreachable part {}", name);
        }
        self.set_part(CONTENT_TYPES_PART, content_types.to_xml()?);

        Ok(removed)
    }
}

/// True for `_rels/.rels` and for relationship parts whose owner is reachable.
fn is_rels_of_reachable(name: &str, reachable: &BTreeSet<String>) -> bool {
    if name == rels_part_name("") {
        return true;
    }
    let Some(stripped) = name.strip_suffix(".rels") else {
        return false;
    };
    let owner = match stripped.rsplit_once("/_rels/") {
        Some((dir, file)) => format!("{}/{}", dir, file),
        None => match stripped.strip_prefix("_rels/") {
            Some(file) => file.to_string(),
            None => return false,
        },
    };
    reachable.contains(&owner)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

    const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#;

    fn small_package() -> Package {
        let mut package = Package::new();
        package.set_part(CONTENT_TYPES_PART, TYPES.as_bytes().to_vec());
        package.set_part("_rels/.rels", ROOT_RELS.as_bytes().to_vec());
        package.set_part("ppt/presentation.xml", b"<p:presentation/>".to_vec());
        package.set_part(
            "ppt/_rels/presentation.xml.rels",
            PRESENTATION_RELS.as_bytes().to_vec(),
        );
        package.set_part("ppt/slides/slide1.xml", b"<p:sld/>".to_vec());
        package.set_part(
            "ppt/slides/_rels/slide1.xml.rels",
            PRESENTATION_RELS.as_bytes().to_vec(),
        );
        package
    }

    #[test]
    fn test_content_types() {
        let mut types = ContentTypes::parse(TYPES.as_bytes()).unwrap();
        assert_eq!(
            types.content_type("ppt/slides/slide1.xml"),
            Some("application/vnd.openxmlformats-officedocument.presentationml.slide+xml")
        );
        assert_eq!(types.content_type("docProps/core.xml"), Some("application/xml"));
        assert_eq!(types.content_type("media/image1.png"), None);

        assert!(types.remove_override("ppt/slides/slide1.xml"));
        assert!(!types.remove_override("ppt/slides/slide1.xml"));

        types.add_override("ppt/slides/slide2.xml", "x/slide");
        let reparsed = ContentTypes::parse(&types.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed, types);
    }

    #[test]
    fn test_zip_round_trip() {
        let package = small_package();
        let bytes = package.to_bytes().unwrap();

        let reopened = Package::from_bytes(&bytes).unwrap();
        let names: Vec<&str> = reopened.part_names().collect();
        assert_eq!(names.len(), 6);
        assert_eq!(reopened.part("ppt/slides/slide1.xml"), Some(&b"<p:sld/>"[..]));
    }

    #[test]
    fn test_not_a_zip() {
        let err = Package::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Package::open("/no/such/deck.pptx").unwrap_err();
        assert!(matches!(err, Error::MissingFile(_)));
    }

    #[test]
    fn test_prune_unreachable_drops_orphaned_slide() {
        let mut package = small_package();

        let removed = package.prune_unreachable().unwrap();

        assert_eq!(
            removed,
            vec![
                "ppt/slides/_rels/slide1.xml.rels".to_string(),
                "ppt/slides/slide1.xml".to_string()
            ]
        );
        assert!(package.contains("ppt/presentation.xml"));
        assert!(package.contains("ppt/_rels/presentation.xml.rels"));
        assert!(package.contains("_rels/.rels"));

        let types = package.content_types().unwrap();
        assert_eq!(types.content_type("ppt/slides/slide1.xml"), Some("application/xml"));

        assert!(package.prune_unreachable().unwrap().is_empty());
    }
}
