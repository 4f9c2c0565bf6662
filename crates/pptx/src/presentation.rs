//! Presentation model: masters, layouts and slides of an open package.
//!
//! Masters, layouts and slides are parsed when the package is opened.
//! Slides and the presentation part are edited in memory and written back
//! to the package on save.

use crate::constants::{
    CONTENT_TYPES_PART, CT_SLIDE, NS_DRAWING, NS_PRESENTATION, NS_RELATIONSHIPS,
    REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_SLIDE, REL_TYPE_SLIDE_LAYOUT,
};
use crate::package::{ContentTypes, Package};
use crate::rels::{rels_part_name, relative_target, resolve_target, Relationships};
use crate::shape::{self, EmuRect};
use crate::template::default_package;
use crate::xml::XmlElement;
use deck_core::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

/// File name of a slide part, capturing its number.
static SLIDE_FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^slide(\d+)\.xml$").unwrap());

/// Smallest slide id PowerPoint accepts.
const MIN_SLIDE_ID: u32 = 256;

/// `r:id`-style attribute of an id-list entry, whatever the prefix.
fn rel_id(element: &XmlElement) -> Option<&str> {
    element
        .attrs
        .iter()
        .find(|(key, _)| key.ends_with(":id"))
        .map(|(_, value)| value.as_str())
}

/// Shape elements directly under `p:cSld/p:spTree`.
fn shapes_of(root: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    root.find(&["cSld", "spTree"])
        .into_iter()
        .flat_map(|tree| tree.elements())
        .filter(|e| shape::is_shape(e))
}

fn load_xml(package: &Package, part: &str) -> Result<XmlElement> {
    XmlElement::parse_bytes(package.require_part(part)?)
        .map_err(|e| Error::PptxParseError(format!("{}: {}", part, e)))
}

/// A slide layout.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    part_name: String,
    xml: XmlElement,
    master: usize,
}

impl SlideLayout {
    /// `p:cSld/@name`; empty when unnamed.
    pub fn name(&self) -> &str {
        self.xml
            .child("cSld")
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Shapes of the layout in document order.
    pub fn shapes(&self) -> impl Iterator<Item = &XmlElement> {
        shapes_of(&self.xml)
    }

    /// First placeholder with the given idx.
    pub fn placeholder(&self, idx: u32) -> Option<&XmlElement> {
        self.shapes()
            .find(|s| shape::placeholder(s).is_some_and(|key| key.idx == idx))
    }
}

/// A slide master and its layouts.
#[derive(Debug, Clone)]
pub struct SlideMaster {
    part_name: String,
    xml: XmlElement,
    layouts: Vec<SlideLayout>,
}

impl SlideMaster {
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Layouts in `p:sldLayoutIdLst` order.
    pub fn layouts(&self) -> &[SlideLayout] {
        &self.layouts
    }

    /// First placeholder of the given type.
    pub fn placeholder(&self, ph_type: &str) -> Option<&XmlElement> {
        shapes_of(&self.xml).find(|s| shape::placeholder(s).is_some_and(|key| key.ph_type == ph_type))
    }
}

/// A slide.
#[derive(Debug, Clone)]
pub struct Slide {
    part_name: String,
    xml: XmlElement,
    rels: Relationships,
    layout_part: String,
}

impl Slide {
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    /// Part name of the layout the slide was created from.
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    /// Shapes of the slide in document order.
    pub fn shapes(&self) -> impl Iterator<Item = &XmlElement> {
        shapes_of(&self.xml)
    }

    /// Placeholder shapes ordered by `idx`, ties in document order.
    pub fn placeholders(&self) -> impl Iterator<Item = &XmlElement> {
        let shapes: Vec<&XmlElement> = self.shapes().collect();
        self.placeholder_order().into_iter().map(move |i| shapes[i])
    }

    /// Mutable placeholder at `position` in [`placeholders`](Self::placeholders).
    pub fn placeholder_mut(&mut self, position: usize) -> Option<&mut XmlElement> {
        let target = *self.placeholder_order().get(position)?;
        self.xml
            .find_mut(&["cSld", "spTree"])?
            .elements_mut()
            .filter(|s| shape::is_shape(s))
            .nth(target)
    }

    /// Positions of the placeholders among [`shapes`](Self::shapes), stably
    /// sorted by `idx`.
    fn placeholder_order(&self) -> Vec<usize> {
        let mut order: Vec<(u32, usize)> = self
            .shapes()
            .enumerate()
            .filter_map(|(i, s)| shape::placeholder(s).map(|key| (key.idx, i)))
            .collect();
        order.sort_by_key(|&(idx, _)| idx);
        order.into_iter().map(|(_, i)| i).collect()
    }

    /// One more than the largest `id` attribute anywhere in the slide.
    pub fn next_shape_id(&self) -> u32 {
        let mut max = 0u32;
        self.xml.walk(&mut |element| {
            if let Some(id) = element.attr("id").and_then(|v| v.parse::<u32>().ok()) {
                max = max.max(id);
            }
        });
        max + 1
    }

    /// Append a text box holding `text` at `rect`.
    pub fn add_text_box(&mut self, rect: EmuRect, text: &str) -> Result<()> {
        let id = self.next_shape_id();
        let part_name = self.part_name.clone();
        let tree = self
            .xml
            .find_mut(&["cSld", "spTree"])
            .ok_or_else(|| Error::PptxParseError(format!("{} has no shape tree", part_name)))?;
        tree.push(shape::new_text_box(id, rect, text));
        Ok(())
    }
}

/// An open presentation.
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    content_types: ContentTypes,
    part_name: String,
    xml: XmlElement,
    rels: Relationships,
    masters: Vec<SlideMaster>,
    slides: Vec<Slide>,
}

impl Presentation {
    /// A new presentation from the built-in default template.
    pub fn new() -> Result<Self> {
        Self::from_package(default_package()?)
    }

    /// Open a `.pptx` file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening presentation {}", path.display());
        Self::from_package(Package::open(path)?)
    }

    /// Open a presentation from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Interpret an already loaded package.
    pub fn from_package(package: Package) -> Result<Self> {
        let main = package
            .relationships("")?
            .first_of_type(REL_TYPE_OFFICE_DOCUMENT)
            .map(|rel| rel.target.clone())
            .ok_or_else(|| Error::CorruptedFile("package has no main document".to_string()))?;
        let part_name = resolve_target("", &main)?;

        let xml = load_xml(&package, &part_name)?;
        if !xml.is("presentation") {
            return Err(Error::CorruptedFile(format!(
                "{} is a '{}', not a presentation",
                part_name, xml.name
            )));
        }
        let rels = package.relationships(&part_name)?;
        let content_types = package.content_types()?;

        let mut masters = Vec::new();
        for entry in xml.find(&["sldMasterIdLst"]).into_iter().flat_map(|l| l.children_named("sldMasterId")) {
            let target = Self::id_list_target(&rels, &part_name, entry)?;
            masters.push(Self::load_master(&package, target, masters.len())?);
        }

        let mut slides = Vec::new();
        for entry in xml.find(&["sldIdLst"]).into_iter().flat_map(|l| l.children_named("sldId")) {
            let target = Self::id_list_target(&rels, &part_name, entry)?;
            slides.push(Self::load_slide(&package, target)?);
        }

        log::debug!(
            "Loaded {} with {} masters and {} slides",
            part_name,
            masters.len(),
            slides.len()
        );

        Ok(Self {
            package,
            content_types,
            part_name,
            xml,
            rels,
            masters,
            slides,
        })
    }

    /// Resolve an id-list entry (`p:sldId`, `p:sldMasterId`, ...) to a part name.
    fn id_list_target(rels: &Relationships, source: &str, entry: &XmlElement) -> Result<String> {
        let id = rel_id(entry)
            .ok_or_else(|| Error::PptxParseError(format!("{} entry without r:id", entry.name)))?;
        let rel = rels
            .get(id)
            .ok_or_else(|| Error::PptxParseError(format!("{} has no relationship {}", source, id)))?;
        resolve_target(source, &rel.target)
    }

    fn load_master(package: &Package, part_name: String, index: usize) -> Result<SlideMaster> {
        let xml = load_xml(package, &part_name)?;
        let rels = package.relationships(&part_name)?;

        let mut layouts = Vec::new();
        for entry in xml.find(&["sldLayoutIdLst"]).into_iter().flat_map(|l| l.children_named("sldLayoutId")) {
            let layout_part = Self::id_list_target(&rels, &part_name, entry)?;
            layouts.push(SlideLayout {
                xml: load_xml(package, &layout_part)?,
                part_name: layout_part,
                master: index,
            });
        }

        Ok(SlideMaster {
            part_name,
            xml,
            layouts,
        })
    }

    fn load_slide(package: &Package, part_name: String) -> Result<Slide> {
        let xml = load_xml(package, &part_name)?;
        let rels = package.relationships(&part_name)?;
        let layout = rels
            .first_of_type(REL_TYPE_SLIDE_LAYOUT)
            .ok_or_else(|| Error::PptxParseError(format!("{} has no slide layout", part_name)))?;
        let layout_part = resolve_target(&part_name, &layout.target)?;

        Ok(Slide {
            part_name,
            xml,
            rels,
            layout_part,
        })
    }

    /// Slide masters in `p:sldMasterIdLst` order.
    pub fn masters(&self) -> &[SlideMaster] {
        &self.masters
    }

    /// Layouts slides are created from: those of the first master.
    pub fn slide_layouts(&self) -> &[SlideLayout] {
        self.masters
            .first()
            .map(|m| m.layouts())
            .unwrap_or_default()
    }

    /// Any master's layout by part name.
    pub fn layout(&self, part_name: &str) -> Option<&SlideLayout> {
        self.masters
            .iter()
            .flat_map(|m| m.layouts.iter())
            .find(|l| l.part_name == part_name)
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Result<&Slide> {
        self.slides.get(index).ok_or(Error::SlideOutOfRange(index))
    }

    pub fn slide_mut(&mut self, index: usize) -> Result<&mut Slide> {
        self.slides.get_mut(index).ok_or(Error::SlideOutOfRange(index))
    }

    /// Layout of the slide at `index`.
    pub fn slide_layout(&self, index: usize) -> Result<&SlideLayout> {
        let slide = self.slide(index)?;
        self.layout(&slide.layout_part).ok_or_else(|| {
            Error::PptxParseError(format!(
                "{} uses layout {} which no master lists",
                slide.part_name, slide.layout_part
            ))
        })
    }

    /// Position and size of a slide shape, following placeholder
    /// inheritance: missing values come from the layout placeholder with the
    /// same idx, then from the master placeholder of the matching type.
    pub fn effective_rect(&self, slide: &Slide, element: &XmlElement) -> EmuRect {
        let own = shape::own_rect(element);
        if own.is_complete() {
            return own;
        }
        let Some(key) = shape::placeholder(element) else {
            return own;
        };
        let Some(layout) = self.layout(&slide.layout_part) else {
            return own;
        };
        let Some(layout_ph) = layout.placeholder(key.idx) else {
            return own;
        };

        let inherited = shape::own_rect(layout_ph);
        let from_master = shape::placeholder(layout_ph)
            .and_then(|layout_key| {
                self.masters
                    .get(layout.master)?
                    .placeholder(layout_key.base_type())
            })
            .map(shape::own_rect)
            .unwrap_or_default();
        own.or(inherited).or(from_master)
    }

    /// Append a slide created from the layout with part name `layout_part`,
    /// copying the layout's placeholders except date, footer and slide
    /// number. Returns the new slide's index.
    pub fn add_slide(&mut self, layout_part: &str) -> Result<usize> {
        let layout = self
            .layout(layout_part)
            .ok_or_else(|| Error::UnresolvedLayout(layout_part.to_string()))?;

        let mut tree = XmlElement::new("p:spTree")
            .with_child(
                XmlElement::new("p:nvGrpSpPr")
                    .with_child(XmlElement::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
                    .with_child(XmlElement::new("p:cNvGrpSpPr"))
                    .with_child(XmlElement::new("p:nvPr")),
            )
            .with_child(XmlElement::new("p:grpSpPr"));
        let mut next_id = 2;
        for layout_shape in layout.shapes() {
            if let Some(clone) = shape::clone_placeholder(layout_shape, next_id) {
                tree.push(clone);
                next_id += 1;
            }
        }
        let xml = XmlElement::new("p:sld")
            .with_attr("xmlns:a", NS_DRAWING)
            .with_attr("xmlns:r", NS_RELATIONSHIPS)
            .with_attr("xmlns:p", NS_PRESENTATION)
            .with_child(XmlElement::new("p:cSld").with_child(tree))
            .with_child(
                XmlElement::new("p:clrMapOvr").with_child(XmlElement::new("a:masterClrMapping")),
            );

        let part_name = self.next_slide_part_name();
        let mut rels = Relationships::new();
        rels.add(relative_target(&part_name, layout_part), REL_TYPE_SLIDE_LAYOUT);
        self.content_types.add_override(&part_name, CT_SLIDE);

        let rel_id = self
            .rels
            .add(relative_target(&self.part_name, &part_name), REL_TYPE_SLIDE);
        self.append_slide_id(&rel_id);

        log::debug!("Added {} from layout {}", part_name, layout_part);
        self.slides.push(Slide {
            part_name,
            xml,
            rels,
            layout_part: layout_part.to_string(),
        });
        Ok(self.slides.len() - 1)
    }

    /// Smallest unused `slides/slideN.xml` next to the presentation part.
    fn next_slide_part_name(&self) -> String {
        let dir = match self.part_name.rsplit_once('/') {
            Some((dir, _)) => format!("{}/slides/", dir),
            None => "slides/".to_string(),
        };
        let used: BTreeSet<u32> = self
            .package
            .part_names()
            .chain(self.slides.iter().map(|s| s.part_name.as_str()))
            .filter_map(|name| name.strip_prefix(dir.as_str()))
            .filter_map(|file| SLIDE_FILE_REGEX.captures(file))
            .filter_map(|caps| caps[1].parse().ok())
            .collect();
        let number = (1..).find(|n| !used.contains(n)).unwrap_or(1);
        format!("{}slide{}.xml", dir, number)
    }

    /// Add a `p:sldId` for `rel_id`, creating `p:sldIdLst` if needed.
    fn append_slide_id(&mut self, rel_id: &str) {
        let prefix = match self.xml.name.split_once(':') {
            Some((prefix, _)) => format!("{}:", prefix),
            None => String::new(),
        };
        let declared = self
            .xml
            .attrs
            .iter()
            .find(|(key, value)| key.starts_with("xmlns:") && value == NS_RELATIONSHIPS)
            .map(|(key, _)| key["xmlns:".len()..].to_string());
        let r_prefix = match declared {
            Some(prefix) => prefix,
            None => {
                self.xml.set_attr("xmlns:r", NS_RELATIONSHIPS);
                "r".to_string()
            }
        };

        if self.xml.child("sldIdLst").is_none() {
            self.xml.insert_after(
                &["sldMasterIdLst", "notesMasterIdLst", "handoutMasterIdLst"],
                XmlElement::new(format!("{}sldIdLst", prefix)),
            );
        }
        if let Some(list) = self.xml.child_mut("sldIdLst") {
            let id = list
                .children_named("sldId")
                .filter_map(|e| e.attr("id")?.parse::<u32>().ok())
                .max()
                .map_or(MIN_SLIDE_ID, |max| (max + 1).max(MIN_SLIDE_ID));
            list.push(
                XmlElement::new(format!("{}sldId", prefix))
                    .with_attr("id", id.to_string())
                    .with_attr(format!("{}:id", r_prefix), rel_id),
            );
        }
    }

    /// Remove every slide. Returns how many were removed.
    ///
    /// Relationships that are already gone are skipped. Parts no longer
    /// reachable afterwards (the slides, their notes and anything only they
    /// used) are dropped from the package. Calling this on a presentation
    /// without slides does nothing.
    pub fn clear_all_slides(&mut self) -> Result<usize> {
        let Some(list) = self.xml.child_mut("sldIdLst") else {
            return Ok(0);
        };
        let rel_ids: Vec<String> = list
            .children_named("sldId")
            .filter_map(rel_id)
            .map(str::to_string)
            .collect();
        list.remove_children("sldId");

        for id in &rel_ids {
            if self.rels.remove(id).is_none() {
                log::debug!("Slide relationship {} already removed, skipping", id);
            }
        }
        for slide in self.slides.drain(..) {
            self.content_types.remove_override(&slide.part_name);
        }

        if rel_ids.is_empty() {
            return Ok(0);
        }

        self.flush()?;
        let dropped = self.package.prune_unreachable()?;
        self.content_types = self.package.content_types()?;
        log::debug!(
            "Cleared {} slides, dropped {} parts",
            rel_ids.len(),
            dropped.len()
        );
        Ok(rel_ids.len())
    }

    /// Write edited parts back into the package.
    fn flush(&mut self) -> Result<()> {
        self.package
            .set_part(self.part_name.as_str(), self.xml.to_xml()?);
        self.package
            .set_part(rels_part_name(&self.part_name), self.rels.to_xml()?);
        for slide in &self.slides {
            self.package
                .set_part(slide.part_name.as_str(), slide.xml.to_xml()?);
            self.package
                .set_part(rels_part_name(&slide.part_name), slide.rels.to_xml()?);
        }
        self.package
            .set_part(CONTENT_TYPES_PART, self.content_types.to_xml()?);
        Ok(())
    }

    /// Serialize to `.pptx` bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush()?;
        self.package.to_bytes()
    }

    /// Save to a `.pptx` file.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.flush()?;
        self.package.save(path)?;
        log::debug!("Saved {} slides to {}", self.slides.len(), path.display());
        Ok(())
    }
}
