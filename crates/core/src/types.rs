//! Interchange types: the normalized JSON representation of a presentation.
//!
//! The JSON document is the only contract between extraction and
//! reconstruction. It is deliberately lossy: slides keep their layout name,
//! shapes keep their type, geometry and plain text, and nothing else.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of EMU (English Metric Units) in one inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// An entire presentation in interchange form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationDocument {
    /// Slides in presentation order. Never reordered.
    pub slides: Vec<SlideRecord>,
}

impl PresentationDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slide record.
    pub fn add_slide(&mut self, slide: SlideRecord) {
        self.slides.push(slide);
    }

    /// Parse a document from JSON text and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// Load a document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON with a four-space indent.
    ///
    /// Non-ASCII text is written as-is.
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|e| Error::MalformedInterchange(e.to_string()))
    }

    /// Write the document to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Check constraints serde cannot express.
    ///
    /// A shape that claims a text frame must carry its text.
    pub fn validate(&self) -> Result<()> {
        for (position, slide) in self.slides.iter().enumerate() {
            for shape in &slide.shapes {
                if shape.has_text_frame && shape.text.is_none() {
                    return Err(Error::MalformedInterchange(format!(
                        "slide {} shape {}: has_text_frame is true but text is missing",
                        position, shape.shape_index
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of shapes that carry text.
    pub fn text_shape_count(&self) -> usize {
        self.slides
            .iter()
            .flat_map(|s| s.shapes.iter())
            .filter(|s| s.has_text_frame)
            .count()
    }
}

/// One slide in interchange form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Position of the slide in its source document. Informational only.
    pub slide_index: usize,

    /// Name of the layout the slide was created from.
    pub layout_name: String,

    /// Shapes in source enumeration order.
    pub shapes: Vec<ShapeRecord>,
}

impl SlideRecord {
    /// Create a slide record with no shapes.
    pub fn new(slide_index: usize, layout_name: impl Into<String>) -> Self {
        Self {
            slide_index,
            layout_name: layout_name.into(),
            shapes: Vec::new(),
        }
    }

    /// Append a shape record.
    pub fn add_shape(&mut self, shape: ShapeRecord) {
        self.shapes.push(shape);
    }
}

/// One shape in interchange form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Position of the shape on its slide.
    pub shape_index: usize,

    /// Shape kind, e.g. `PLACEHOLDER`, `TEXT_BOX`, `PICTURE`.
    pub shape_type: String,

    /// Distance from the left edge of the slide, in inches.
    #[serde(default)]
    pub left: Option<f64>,

    /// Distance from the top edge of the slide, in inches.
    #[serde(default)]
    pub top: Option<f64>,

    /// Width in inches.
    #[serde(default)]
    pub width: Option<f64>,

    /// Height in inches.
    #[serde(default)]
    pub height: Option<f64>,

    /// Whether the shape has a text frame.
    pub has_text_frame: bool,

    /// Plain text of the text frame. Present only when `has_text_frame`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ShapeRecord {
    /// Geometry of this record.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }
}

/// Shape geometry in inches; any field may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Geometry {
    /// Geometry with every field known.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Resolve to a concrete frame, filling unknown fields with the
    /// text-box defaults: 1 inch left and top, 6 inches wide, 1 inch high.
    pub fn or_text_box_defaults(&self) -> Frame {
        Frame {
            left: self.left.unwrap_or(1.0),
            top: self.top.unwrap_or(1.0),
            width: self.width.unwrap_or(6.0),
            height: self.height.unwrap_or(1.0),
        }
    }
}

/// A fully specified rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let json = r#"{
            "slides": [
                {
                    "slide_index": 0,
                    "layout_name": "Title Slide",
                    "shapes": [
                        {
                            "shape_index": 0,
                            "shape_type": "PLACEHOLDER",
                            "left": 0.75, "top": 2.33, "width": 8.5, "height": 1.6,
                            "has_text_frame": true,
                            "text": "Hello"
                        },
                        {
                            "shape_index": 1,
                            "shape_type": "PICTURE",
                            "left": 1.0, "top": 1.0, "width": 2.0, "height": 2.0,
                            "has_text_frame": false
                        }
                    ]
                }
            ]
        }"#;

        let doc = PresentationDocument::from_json_str(json).unwrap();
        assert_eq!(doc.slides.len(), 1);
        assert_eq!(doc.slides[0].layout_name, "Title Slide");
        assert_eq!(doc.slides[0].shapes[0].text.as_deref(), Some("Hello"));
        assert_eq!(doc.slides[0].shapes[1].text, None);
        assert_eq!(doc.text_shape_count(), 1);
    }

    #[test]
    fn test_geometry_may_be_null_or_absent() {
        let json = r#"{"slides": [{"slide_index": 0, "layout_name": "Blank", "shapes": [
            {"shape_index": 0, "shape_type": "TEXT_BOX", "left": null, "has_text_frame": true, "text": "x"}
        ]}]}"#;

        let doc = PresentationDocument::from_json_str(json).unwrap();
        let geometry = doc.slides[0].shapes[0].geometry();
        assert_eq!(geometry, Geometry::default());
    }

    #[test]
    fn test_missing_required_key_is_malformed() {
        let json = r#"{"slides": [{"slide_index": 0, "shapes": []}]}"#;
        let err = PresentationDocument::from_json_str(json).unwrap_err();
        assert!(matches!(err, Error::MalformedInterchange(_)));
    }

    #[test]
    fn test_text_frame_without_text_is_malformed() {
        let json = r#"{"slides": [{"slide_index": 0, "layout_name": "Blank", "shapes": [
            {"shape_index": 3, "shape_type": "TEXT_BOX", "has_text_frame": true}
        ]}]}"#;

        let err = PresentationDocument::from_json_str(json).unwrap_err();
        match err {
            Error::MalformedInterchange(reason) => assert!(reason.contains("shape 3")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = PresentationDocument::from_json_str("slides: []").unwrap_err();
        assert!(matches!(err, Error::MalformedInterchange(_)));
    }

    #[test]
    fn test_serialization_omits_text_for_non_text_shapes() {
        let mut slide = SlideRecord::new(0, "Blank");
        slide.add_shape(ShapeRecord {
            shape_index: 0,
            shape_type: "PICTURE".to_string(),
            left: Some(1.0),
            top: Some(1.0),
            width: Some(2.0),
            height: Some(2.0),
            has_text_frame: false,
            text: None,
        });
        let mut doc = PresentationDocument::new();
        doc.add_slide(slide);

        let json = doc.to_json_string().unwrap();
        assert!(!json.contains("\"text\""));
        assert!(json.contains("\n    \"slides\""));
    }

    #[test]
    fn test_serialization_keeps_non_ascii_text() {
        let mut slide = SlideRecord::new(0, "Title Slide");
        slide.add_shape(ShapeRecord {
            shape_index: 0,
            shape_type: "PLACEHOLDER".to_string(),
            left: None,
            top: None,
            width: None,
            height: None,
            has_text_frame: true,
            text: Some("주님의 은혜".to_string()),
        });
        let doc = PresentationDocument { slides: vec![slide] };

        let json = doc.to_json_string().unwrap();
        assert!(json.contains("주님의 은혜"));
        assert_eq!(PresentationDocument::from_json_str(&json).unwrap(), doc);
    }

    #[test]
    fn test_text_box_defaults() {
        let frame = Geometry::default().or_text_box_defaults();
        assert_eq!(
            frame,
            Frame {
                left: 1.0,
                top: 1.0,
                width: 6.0,
                height: 1.0
            }
        );

        let partial = Geometry {
            left: Some(2.5),
            top: None,
            width: None,
            height: Some(0.5),
        };
        let frame = partial.or_text_box_defaults();
        assert_eq!(frame.left, 2.5);
        assert_eq!(frame.top, 1.0);
        assert_eq!(frame.width, 6.0);
        assert_eq!(frame.height, 0.5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PresentationDocument::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::MissingFile(_)));
    }
}
