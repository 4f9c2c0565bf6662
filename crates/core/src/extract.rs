//! Presentation → interchange JSON.

use crate::deck::DeckSource;
use crate::error::Result;
use crate::types::{PresentationDocument, ShapeRecord, SlideRecord};
use std::path::Path;

/// Walks a presentation and produces its interchange document.
#[derive(Debug, Clone, Default)]
pub struct Extractor;

impl Extractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Produce one slide record per slide and one shape record per shape,
    /// both in document order.
    pub fn extract<S: DeckSource + ?Sized>(&self, source: &S) -> Result<PresentationDocument> {
        let mut document = PresentationDocument::new();

        for slide_index in 0..source.slide_count() {
            let layout_name = source.slide_layout_name(slide_index)?;
            let mut slide = SlideRecord::new(slide_index, layout_name);

            for (shape_index, shape) in source.slide_shapes(slide_index)?.into_iter().enumerate() {
                slide.add_shape(ShapeRecord {
                    shape_index,
                    shape_type: shape.shape_type,
                    left: shape.frame.left,
                    top: shape.frame.top,
                    width: shape.frame.width,
                    height: shape.frame.height,
                    has_text_frame: shape.text.is_some(),
                    text: shape.text,
                });
            }

            log::debug!(
                "Extracted slide {} ('{}') with {} shapes",
                slide_index,
                slide.layout_name,
                slide.shapes.len()
            );
            document.add_slide(slide);
        }

        Ok(document)
    }

    /// Extract and write the interchange document to `path`.
    pub fn extract_to_file<S: DeckSource + ?Sized>(
        &self,
        source: &S,
        path: impl AsRef<Path>,
    ) -> Result<PresentationDocument> {
        let document = self.extract(source)?;
        document.save(path.as_ref())?;
        log::info!(
            "Presentation converted to JSON: {} ({} slides)",
            path.as_ref().display(),
            document.slides.len()
        );
        Ok(document)
    }
}
