//! Shapes of a slide tree: kind, placeholder identity, geometry and text.
//!
//! Shapes are the element children of `p:spTree`. Functions here read and
//! edit those elements directly.

use crate::constants::{EMU_PER_INCH, URI_CHART, URI_DIAGRAM, URI_OLE, URI_TABLE};
use crate::xml::XmlElement;
use deck_core::{Frame, Geometry};

/// Local names of the elements that are shapes.
pub const SHAPE_ELEMENTS: &[&str] = &["sp", "grpSp", "graphicFrame", "cxnSp", "pic"];

/// Placeholder types that are not copied onto new slides.
const FOOTER_PLACEHOLDERS: &[&str] = &["dt", "ftr", "sldNum"];

/// Placeholder types that get an empty text body when copied.
const TEXT_PLACEHOLDERS: &[&str] = &["title", "ctrTitle", "subTitle", "body", "obj"];

/// Line break inside a paragraph, as it appears in plain text.
pub const LINE_BREAK: char = '\u{000B}';

/// True if `element` is a shape.
pub fn is_shape(element: &XmlElement) -> bool {
    SHAPE_ELEMENTS.contains(&element.local_name())
}

/// Placeholder identity of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderKey {
    /// `p:ph/@type`, `obj` when absent.
    pub ph_type: String,
    /// `p:ph/@idx`, 0 when absent.
    pub idx: u32,
}

impl PlaceholderKey {
    /// Type of the master placeholder a layout placeholder inherits from.
    pub fn base_type(&self) -> &str {
        match self.ph_type.as_str() {
            "title" | "ctrTitle" => "title",
            "dt" => "dt",
            "ftr" => "ftr",
            "sldNum" => "sldNum",
            _ => "body",
        }
    }
}

/// The non-visual properties element (`p:nvSpPr`, `p:nvPicPr`, ...).
fn non_visual(shape: &XmlElement) -> Option<&XmlElement> {
    shape.elements().find(|e| e.local_name().starts_with("nv"))
}

fn ph_element(shape: &XmlElement) -> Option<&XmlElement> {
    non_visual(shape)?.find(&["nvPr", "ph"])
}

/// Placeholder identity, if the shape is a placeholder.
pub fn placeholder(shape: &XmlElement) -> Option<PlaceholderKey> {
    let ph = ph_element(shape)?;
    Some(PlaceholderKey {
        ph_type: ph.attr("type").unwrap_or("obj").to_string(),
        idx: ph.attr("idx").and_then(|v| v.parse().ok()).unwrap_or(0),
    })
}

/// `p:cNvPr/@name`.
pub fn shape_name(shape: &XmlElement) -> &str {
    non_visual(shape)
        .and_then(|nv| nv.child("cNvPr"))
        .and_then(|c| c.attr("name"))
        .unwrap_or_default()
}

/// Upper-snake-case kind name of a shape.
pub fn shape_type(shape: &XmlElement) -> &'static str {
    if placeholder(shape).is_some() {
        return "PLACEHOLDER";
    }
    match shape.local_name() {
        "sp" => {
            let is_text_box = non_visual(shape)
                .and_then(|nv| nv.child("cNvSpPr"))
                .and_then(|c| c.attr("txBox"))
                .is_some_and(|v| v == "1" || v == "true");
            if is_text_box {
                "TEXT_BOX"
            } else if shape.find(&["spPr", "custGeom"]).is_some() {
                "FREEFORM"
            } else {
                "AUTO_SHAPE"
            }
        }
        "pic" => "PICTURE",
        "grpSp" => "GROUP",
        "cxnSp" => "LINE",
        "graphicFrame" => {
            let uri = shape
                .find(&["graphic", "graphicData"])
                .and_then(|g| g.attr("uri"))
                .unwrap_or_default();
            match uri {
                URI_TABLE => "TABLE",
                URI_CHART => "CHART",
                URI_DIAGRAM => "DIAGRAM",
                URI_OLE => "EMBEDDED_OLE_OBJECT",
                _ => "GRAPHIC_FRAME",
            }
        }
        _ => "UNKNOWN",
    }
}

/// Position and size in EMU; any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmuRect {
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub cx: Option<i64>,
    pub cy: Option<i64>,
}

impl EmuRect {
    /// Rectangle from a frame in inches, truncating to whole EMU.
    pub fn from_frame(frame: Frame) -> Self {
        let emu = |inches: f64| Some((inches * EMU_PER_INCH as f64) as i64);
        Self {
            x: emu(frame.left),
            y: emu(frame.top),
            cx: emu(frame.width),
            cy: emu(frame.height),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some() && self.cx.is_some() && self.cy.is_some()
    }

    /// Fill missing fields from `fallback`.
    pub fn or(self, fallback: EmuRect) -> Self {
        Self {
            x: self.x.or(fallback.x),
            y: self.y.or(fallback.y),
            cx: self.cx.or(fallback.cx),
            cy: self.cy.or(fallback.cy),
        }
    }

    /// Convert to inches.
    pub fn to_geometry(self) -> Geometry {
        let inches = |emu: Option<i64>| emu.map(|v| v as f64 / EMU_PER_INCH as f64);
        Geometry {
            left: inches(self.x),
            top: inches(self.y),
            width: inches(self.cx),
            height: inches(self.cy),
        }
    }
}

/// The shape's own transform.
pub fn own_rect(shape: &XmlElement) -> EmuRect {
    let xfrm = match shape.local_name() {
        "graphicFrame" => shape.child("xfrm"),
        "grpSp" => shape.find(&["grpSpPr", "xfrm"]),
        _ => shape.find(&["spPr", "xfrm"]),
    };
    let Some(xfrm) = xfrm else {
        return EmuRect::default();
    };

    let number = |element: &str, attr: &str| -> Option<i64> {
        xfrm.child(element)?.attr(attr)?.parse().ok()
    };
    EmuRect {
        x: number("off", "x"),
        y: number("off", "y"),
        cx: number("ext", "cx"),
        cy: number("ext", "cy"),
    }
}

/// Only `p:sp` shapes carry a text frame.
pub fn has_text_frame(shape: &XmlElement) -> bool {
    shape.is("sp")
}

/// Plain text of a shape: paragraphs joined with `\n`, line breaks as
/// vertical tab. Empty if the shape has no text body.
pub fn text(shape: &XmlElement) -> String {
    match shape.child("txBody") {
        Some(body) => body
            .children_named("p")
            .map(paragraph_text)
            .collect::<Vec<_>>()
            .join("\n"),
        None => String::new(),
    }
}

fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for child in paragraph.elements() {
        match child.local_name() {
            "r" | "fld" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text());
                }
            }
            "br" => text.push(LINE_BREAK),
            _ => {}
        }
    }
    text
}

/// Replace a shape's paragraphs with `text`.
///
/// Each `\n` starts a new paragraph and each vertical tab becomes a line
/// break. Body and list properties are kept; a missing text body is added.
pub fn set_text(shape: &mut XmlElement, text: &str) {
    if shape.child("txBody").is_none() {
        shape.insert_after(&["nvSpPr", "spPr", "style"], empty_text_body());
    }
    if let Some(body) = shape.child_mut("txBody") {
        body.remove_children("p");
        for line in text.split('\n') {
            body.push(paragraph(line));
        }
    }
}

fn paragraph(line: &str) -> XmlElement {
    let mut p = XmlElement::new("a:p");
    for (i, segment) in line.split(LINE_BREAK).enumerate() {
        if i > 0 {
            p.push(XmlElement::new("a:br"));
        }
        if !segment.is_empty() {
            p.push(XmlElement::new("a:r").with_child(XmlElement::new("a:t").with_text(segment)));
        }
    }
    p
}

fn empty_text_body() -> XmlElement {
    XmlElement::new("p:txBody")
        .with_child(XmlElement::new("a:bodyPr"))
        .with_child(XmlElement::new("a:lstStyle"))
        .with_child(XmlElement::new("a:p"))
}

/// Copy a layout placeholder onto a new slide as shape `id`.
///
/// Returns `None` for date, footer and slide-number placeholders. The copy
/// has no transform of its own, so it inherits position from the layout.
pub fn clone_placeholder(layout_shape: &XmlElement, id: u32) -> Option<XmlElement> {
    let ph = ph_element(layout_shape)?;
    let ph_type = ph.attr("type").unwrap_or("obj");
    if FOOTER_PLACEHOLDERS.contains(&ph_type) {
        return None;
    }

    let mut new_ph = XmlElement::new("p:ph");
    for attr in ["type", "orient", "sz", "idx"] {
        if let Some(value) = ph.attr(attr) {
            new_ph.set_attr(attr, value);
        }
    }

    let mut sp = XmlElement::new("p:sp")
        .with_child(
            XmlElement::new("p:nvSpPr")
                .with_child(
                    XmlElement::new("p:cNvPr")
                        .with_attr("id", id.to_string())
                        .with_attr("name", shape_name(layout_shape)),
                )
                .with_child(
                    XmlElement::new("p:cNvSpPr")
                        .with_child(XmlElement::new("a:spLocks").with_attr("noGrp", "1")),
                )
                .with_child(XmlElement::new("p:nvPr").with_child(new_ph)),
        )
        .with_child(XmlElement::new("p:spPr"));

    if TEXT_PLACEHOLDERS.contains(&ph_type) {
        sp.push(empty_text_body());
    }
    Some(sp)
}

/// A free-standing text box holding `text`.
pub fn new_text_box(id: u32, rect: EmuRect, text: &str) -> XmlElement {
    let number = |v: Option<i64>| v.unwrap_or_default().to_string();
    let mut sp = XmlElement::new("p:sp")
        .with_child(
            XmlElement::new("p:nvSpPr")
                .with_child(
                    XmlElement::new("p:cNvPr")
                        .with_attr("id", id.to_string())
                        .with_attr("name", format!("TextBox {}", id.saturating_sub(1))),
                )
                .with_child(XmlElement::new("p:cNvSpPr").with_attr("txBox", "1"))
                .with_child(XmlElement::new("p:nvPr")),
        )
        .with_child(
            XmlElement::new("p:spPr")
                .with_child(
                    XmlElement::new("a:xfrm")
                        .with_child(
                            XmlElement::new("a:off")
                                .with_attr("x", number(rect.x))
                                .with_attr("y", number(rect.y)),
                        )
                        .with_child(
                            XmlElement::new("a:ext")
                                .with_attr("cx", number(rect.cx))
                                .with_attr("cy", number(rect.cy)),
                        ),
                )
                .with_child(
                    XmlElement::new("a:prstGeom")
                        .with_attr("prst", "rect")
                        .with_child(XmlElement::new("a:avLst")),
                )
                .with_child(XmlElement::new("a:noFill")),
        )
        .with_child(
            XmlElement::new("p:txBody")
                .with_child(
                    XmlElement::new("a:bodyPr")
                        .with_attr("wrap", "none")
                        .with_child(XmlElement::new("a:spAutoFit")),
                )
                .with_child(XmlElement::new("a:lstStyle"))
                .with_child(XmlElement::new("a:p")),
        );
    set_text(&mut sp, text);
    sp
}
