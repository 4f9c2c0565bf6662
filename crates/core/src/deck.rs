//! Capability traits over a live presentation document.
//!
//! Extraction and reconstruction only need a handful of operations from the
//! document library. Expressing them as traits keeps the conversion policy
//! independent of the file format.

use crate::error::Result;
use crate::types::{Frame, Geometry};

/// A shape as seen by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    /// Shape kind name, e.g. `PLACEHOLDER` or `PICTURE`.
    pub shape_type: String,

    /// Position and size in inches.
    pub frame: Geometry,

    /// Plain text of the text frame; `None` when the shape has no text frame.
    pub text: Option<String>,
}

/// A placeholder on a slide as seen by the reconstructor.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSlot {
    /// Placeholder `idx` (0 for title placeholders).
    pub idx: u32,

    /// Whether text can be written into this placeholder.
    pub has_text_frame: bool,

    /// Current plain text.
    pub text: String,
}

impl PlaceholderSlot {
    /// True if this placeholder can take text and has none yet.
    pub fn is_empty_text_slot(&self) -> bool {
        self.has_text_frame && self.text.is_empty()
    }
}

/// Read access to an open presentation.
pub trait DeckSource {
    /// Number of slides.
    fn slide_count(&self) -> usize;

    /// Name of the layout the slide at `slide` was created from.
    fn slide_layout_name(&self, slide: usize) -> Result<String>;

    /// Shapes of the slide at `slide`, in document order.
    fn slide_shapes(&self, slide: usize) -> Result<Vec<ShapeInfo>>;
}

/// Write access to a presentation that slides can be added to.
pub trait DeckTarget {
    /// Handle identifying a layout within this target.
    type Layout: Clone;

    /// Available layouts with their names, in native order.
    fn layouts(&self) -> Result<Vec<(String, Self::Layout)>>;

    /// Append a slide created from `layout`; returns the new slide's index.
    fn add_slide(&mut self, layout: &Self::Layout) -> Result<usize>;

    /// Placeholders of the slide at `slide`, ordered by `idx`. Placeholders
    /// sharing an `idx` keep their slide order.
    fn placeholders(&self, slide: usize) -> Result<Vec<PlaceholderSlot>>;

    /// Replace the text of the placeholder at `position` in [`placeholders`].
    ///
    /// [`placeholders`]: DeckTarget::placeholders
    fn set_placeholder_text(&mut self, slide: usize, position: usize, text: &str) -> Result<()>;

    /// Add a free-standing text box holding `text`.
    fn add_text_box(&mut self, slide: usize, frame: Frame, text: &str) -> Result<()>;
}
