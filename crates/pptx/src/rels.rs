//! Relationship parts (`_rels/*.rels`) and part-name arithmetic.
//!
//! Every part that points at other parts does so through its relationship
//! part. Relationship ids (`rId1`, `rId2`, ...) are what the XML refers to;
//! targets are paths relative to the source part's directory.

use crate::constants::NS_PACKAGE_RELATIONSHIPS;
use crate::xml::XmlElement;
use deck_core::{Error, Result};

/// One relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `External` for URLs; `None` for parts inside the package.
    pub target_mode: Option<String>,
}

impl Relationship {
    /// True if the target lives outside the package.
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some("External")
    }
}

/// Parsed relationships of one source part, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = XmlElement::parse_bytes(bytes)?;
        let mut entries = Vec::new();

        for rel in root.children_named("Relationship") {
            let (Some(id), Some(target)) = (rel.attr("Id"), rel.attr("Target")) else {
                log::debug!("Skipping relationship without Id or Target");
                continue;
            };
            entries.push(Relationship {
                id: id.to_string(),
                rel_type: rel.attr("Type").unwrap_or_default().to_string(),
                target: target.to_string(),
                target_mode: rel.attr("TargetMode").map(str::to_string),
            });
        }

        Ok(Self { entries })
    }

    /// Serialize to a `.rels` part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Relationships").with_attr("xmlns", NS_PACKAGE_RELATIONSHIPS);
        for rel in &self.entries {
            let mut element = XmlElement::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if let Some(mode) = &rel.target_mode {
                element.set_attr("TargetMode", mode.as_str());
            }
            root.push(element);
        }
        root.to_xml()
    }

    /// Add an internal relationship and return its new id.
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let id = self.next_id();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
            target_mode: None,
        });
        id
    }

    /// Remove a relationship by id, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let position = self.entries.iter().position(|r| r.id == id)?;
        Some(self.entries.remove(position))
    }

    /// Look up a relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// First relationship of the given type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.rel_type == rel_type)
    }

    /// All relationships in order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest `rIdN` greater than every numeric id in use.
    fn next_id(&self) -> String {
        let max = self
            .entries
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

/// Name of the relationship part belonging to `part`.
///
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`;
/// the package itself (empty name) → `_rels/.rels`.
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> Result<String> {
    if let Some(absolute) = target.strip_prefix('/') {
        return Ok(absolute.to_string());
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or_else(|| {
                    Error::PptxParseError(format!(
                        "target '{}' escapes the package from '{}'",
                        target, source_part
                    ))
                })?;
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Relative target that reaches `target_part` from `source_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();
    let (target_dir, file) = target.split_at(target.len() - 1);

    let common = source_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(source_dir.len() - common).collect();
    parts.extend_from_slice(&target_dir[common..]);
    parts.extend_from_slice(file);
    parts.join("/")
}
