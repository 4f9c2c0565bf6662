//! In-memory deck used by unit tests.

use crate::deck::{DeckSource, DeckTarget, PlaceholderSlot, ShapeInfo};
use crate::error::{Error, Result};
use crate::types::{Frame, Geometry};

#[derive(Debug, Clone)]
pub struct MemoryShape {
    pub info: ShapeInfo,
}

impl MemoryShape {
    pub fn text(shape_type: &str, frame: Geometry, text: &str) -> Self {
        Self {
            info: ShapeInfo {
                shape_type: shape_type.to_string(),
                frame,
                text: Some(text.to_string()),
            },
        }
    }

    pub fn other(shape_type: &str, frame: Geometry) -> Self {
        Self {
            info: ShapeInfo {
                shape_type: shape_type.to_string(),
                frame,
                text: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryLayout {
    pub name: String,
    /// Placeholder `(idx, has_text_frame)` pairs in layout order.
    pub slots: Vec<(u32, bool)>,
}

#[derive(Debug, Clone)]
pub struct MemorySlide {
    /// Index into `MemoryDeck::layouts`.
    pub layout: usize,
    pub placeholders: Vec<PlaceholderSlot>,
    pub shapes: Vec<MemoryShape>,
    pub text_boxes: Vec<(Frame, String)>,
}

/// A deck that keeps layouts, placeholders and text boxes as plain data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeck {
    pub layouts: Vec<MemoryLayout>,
    pub slides: Vec<MemorySlide>,
}

impl MemoryDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layout whose placeholders all accept text.
    pub fn layout(self, name: &str, placeholder_idx: &[u32]) -> Self {
        let slots: Vec<(u32, bool)> = placeholder_idx.iter().map(|&idx| (idx, true)).collect();
        self.layout_with_slots(name, &slots)
    }

    pub fn layout_with_slots(mut self, name: &str, slots: &[(u32, bool)]) -> Self {
        self.layouts.push(MemoryLayout {
            name: name.to_string(),
            slots: slots.to_vec(),
        });
        self
    }

    /// Add a pre-existing slide with the given shapes (for extraction).
    pub fn push_slide(&mut self, layout_name: &str, shapes: Vec<MemoryShape>) {
        let layout = self
            .layouts
            .iter()
            .position(|l| l.name == layout_name)
            .expect("layout registered");
        self.slides.push(MemorySlide {
            layout,
            placeholders: Vec::new(),
            shapes,
            text_boxes: Vec::new(),
        });
    }

    pub fn placeholder_texts(&self, slide: usize) -> Vec<&str> {
        self.slides[slide]
            .placeholders
            .iter()
            .map(|p| p.text.as_str())
            .collect()
    }

    fn slide(&self, slide: usize) -> Result<&MemorySlide> {
        self.slides.get(slide).ok_or(Error::SlideOutOfRange(slide))
    }

    fn slide_mut(&mut self, slide: usize) -> Result<&mut MemorySlide> {
        self.slides.get_mut(slide).ok_or(Error::SlideOutOfRange(slide))
    }
}

impl DeckSource for MemoryDeck {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn slide_layout_name(&self, slide: usize) -> Result<String> {
        let layout = self.slide(slide)?.layout;
        Ok(self.layouts[layout].name.clone())
    }

    fn slide_shapes(&self, slide: usize) -> Result<Vec<ShapeInfo>> {
        Ok(self.slide(slide)?.shapes.iter().map(|s| s.info.clone()).collect())
    }
}

impl DeckTarget for MemoryDeck {
    type Layout = usize;

    fn layouts(&self) -> Result<Vec<(String, usize)>> {
        Ok(self
            .layouts
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect())
    }

    fn add_slide(&mut self, layout: &usize) -> Result<usize> {
        let mut slots = self.layouts[*layout].slots.clone();
        slots.sort_by_key(|&(idx, _)| idx);
        let placeholders = slots
            .iter()
            .map(|&(idx, has_text_frame)| PlaceholderSlot {
                idx,
                has_text_frame,
                text: String::new(),
            })
            .collect();
        self.slides.push(MemorySlide {
            layout: *layout,
            placeholders,
            shapes: Vec::new(),
            text_boxes: Vec::new(),
        });
        Ok(self.slides.len() - 1)
    }

    fn placeholders(&self, slide: usize) -> Result<Vec<PlaceholderSlot>> {
        Ok(self.slide(slide)?.placeholders.clone())
    }

    fn set_placeholder_text(&mut self, slide: usize, position: usize, text: &str) -> Result<()> {
        let placeholder = self
            .slide_mut(slide)?
            .placeholders
            .get_mut(position)
            .ok_or(Error::PlaceholderOutOfRange { slide, position })?;
        placeholder.text = text.to_string();
        Ok(())
    }

    fn add_text_box(&mut self, slide: usize, frame: Frame, text: &str) -> Result<()> {
        self.slide_mut(slide)?
            .text_boxes
            .push((frame, text.to_string()));
        Ok(())
    }
}
