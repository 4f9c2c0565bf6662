//! # deck-pptx
//!
//! PPTX (Office Open XML) presentations: open, inspect, add slides, clear and
//! save. Implements the `deck-core` capability traits so extraction and
//! reconstruction run directly against a PPTX file.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deck_core::{Extractor, Reconstructor};
//! use deck_pptx::Presentation;
//!
//! let source = Presentation::open("service.pptx")?;
//! let document = Extractor::new().extract(&source)?;
//!
//! let mut target = Presentation::new()?;
//! Reconstructor::new().reconstruct(&document, &mut target)?;
//! target.save("rebuilt.pptx")?;
//! ```

pub mod deck;
pub mod package;
pub mod presentation;
pub mod rels;
pub mod shape;
pub mod template;
pub mod xml;

// Re-exports
pub use package::{ContentTypes, Package};
pub use presentation::{Presentation, Slide, SlideLayout, SlideMaster};
pub use rels::{Relationship, Relationships};
pub use xml::XmlElement;

/// Namespaces, relationship types, content types and sizes.
pub mod constants {
    /// `p:sldSz/@cx` of the built-in template.
    pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// `p:sldSz/@cy` of the built-in template.
    pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    pub const EMU_PER_INCH: i64 = 914_400;

    /// Name of the content types part
    pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace (the `r:` prefix)
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Package relationships namespace (`.rels` parts)
    pub const NS_PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Content Types namespace
    pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

    /// Main document relationship type
    pub const REL_TYPE_OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Presentation properties relationship type
    pub const REL_TYPE_PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";

    /// Core properties relationship type
    pub const REL_TYPE_CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

    /// Extended properties relationship type
    pub const REL_TYPE_EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

    /// Content type of the main presentation part
    pub const CT_PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

    /// Content type of a slide part
    pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

    /// Content type of a slide layout part
    pub const CT_SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";

    /// Content type of a slide master part
    pub const CT_SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";

    /// Content type of a theme part
    pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

    /// Content type of the presentation properties part
    pub const CT_PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";

    /// Content type of the core properties part
    pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";

    /// Content type of the extended properties part
    pub const CT_EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";

    /// Content type of relationship parts
    pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

    /// `graphicData/@uri` of a table
    pub const URI_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

    /// `graphicData/@uri` of a chart
    pub const URI_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

    /// `graphicData/@uri` of a SmartArt diagram
    pub const URI_DIAGRAM: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";

    /// `graphicData/@uri` of an embedded OLE object
    pub const URI_OLE: &str = "http://schemas.openxmlformats.org/presentationml/2006/ole";
}
