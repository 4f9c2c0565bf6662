//! `deck-core` capability traits for [`Presentation`].
//!
//! Layouts are identified by their part name, taken from the first master.

use crate::presentation::Presentation;
use crate::shape::{self, EmuRect};
use deck_core::{DeckSource, DeckTarget, Error, Frame, PlaceholderSlot, Result, ShapeInfo};

impl DeckSource for Presentation {
    fn slide_count(&self) -> usize {
        self.slides().len()
    }

    fn slide_layout_name(&self, slide: usize) -> Result<String> {
        Ok(self.slide_layout(slide)?.name().to_string())
    }

    fn slide_shapes(&self, slide: usize) -> Result<Vec<ShapeInfo>> {
        let slide = self.slide(slide)?;
        Ok(slide
            .shapes()
            .map(|element| ShapeInfo {
                shape_type: shape::shape_type(element).to_string(),
                frame: self.effective_rect(slide, element).to_geometry(),
                text: shape::has_text_frame(element).then(|| shape::text(element)),
            })
            .collect())
    }
}

impl DeckTarget for Presentation {
    type Layout = String;

    fn layouts(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .slide_layouts()
            .iter()
            .map(|layout| (layout.name().to_string(), layout.part_name().to_string()))
            .collect())
    }

    fn add_slide(&mut self, layout: &String) -> Result<usize> {
        Presentation::add_slide(self, layout)
    }

    fn placeholders(&self, slide: usize) -> Result<Vec<PlaceholderSlot>> {
        Ok(self
            .slide(slide)?
            .placeholders()
            .map(|element| PlaceholderSlot {
                idx: shape::placeholder(element).map_or(0, |key| key.idx),
                has_text_frame: shape::has_text_frame(element),
                text: shape::text(element),
            })
            .collect())
    }

    fn set_placeholder_text(&mut self, slide: usize, position: usize, text: &str) -> Result<()> {
        let element = self
            .slide_mut(slide)?
            .placeholder_mut(position)
            .ok_or(Error::PlaceholderOutOfRange { slide, position })?;
        shape::set_text(element, text);
        Ok(())
    }

    fn add_text_box(&mut self, slide: usize, frame: Frame, text: &str) -> Result<()> {
        self.slide_mut(slide)?
            .add_text_box(EmuRect::from_frame(frame), text)
    }
}
