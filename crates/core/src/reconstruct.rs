//! Interchange JSON → presentation.
//!
//! Slides are created from named layouts of the target and text is written
//! into the first empty text placeholder, falling back to a free-standing
//! text box at the recorded geometry. Non-text shapes are not rebuilt.

use crate::deck::DeckTarget;
use crate::error::{Error, Result};
use crate::types::{PresentationDocument, SlideRecord};
use std::collections::HashMap;

/// Layout used by the lenient policy when a name does not resolve.
pub const FALLBACK_LAYOUT_INDEX: usize = 1;

/// What to do when a slide names a layout the target does not have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Abort the whole reconstruction, reporting the missing name.
    #[default]
    Strict,
    /// Substitute layout 1 (layout 0 if there is only one) and warn.
    Lenient,
}

/// Layout lookup built once per reconstruction.
///
/// Later layouts overwrite earlier ones with the same name, so on a
/// collision only the last enumerated layout is reachable by name.
#[derive(Debug, Clone)]
pub struct LayoutMap<L> {
    by_name: HashMap<String, L>,
    ordered: Vec<L>,
}

impl<L: Clone> LayoutMap<L> {
    /// Build the map from layouts in their native order.
    pub fn new(layouts: Vec<(String, L)>) -> Self {
        let mut by_name = HashMap::with_capacity(layouts.len());
        let mut ordered = Vec::with_capacity(layouts.len());
        for (name, layout) in layouts {
            by_name.insert(name, layout.clone());
            ordered.push(layout);
        }
        Self { by_name, ordered }
    }

    /// Look a layout up by name.
    pub fn get(&self, name: &str) -> Option<&L> {
        self.by_name.get(name)
    }

    /// The lenient fallback: index 1, else index 0.
    pub fn fallback(&self) -> Option<&L> {
        self.ordered
            .get(FALLBACK_LAYOUT_INDEX)
            .or_else(|| self.ordered.first())
    }

    /// Number of layouts enumerated (including shadowed duplicates).
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// True if no layouts were enumerated.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Counts of what a reconstruction did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructReport {
    pub slides_created: usize,
    pub placeholders_filled: usize,
    pub text_boxes_added: usize,
    pub shapes_skipped: usize,
    pub layout_fallbacks: usize,
}

/// Rebuilds a presentation from an interchange document.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    policy: LayoutPolicy,
}

impl Reconstructor {
    /// Create a reconstructor with the strict layout policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for unresolved layout names.
    pub fn with_policy(mut self, policy: LayoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append one slide per record to `target`, in record order.
    ///
    /// All layouts are resolved before the first slide is added, so a strict
    /// failure leaves `target` unchanged.
    pub fn reconstruct<T: DeckTarget + ?Sized>(
        &self,
        document: &PresentationDocument,
        target: &mut T,
    ) -> Result<ReconstructReport> {
        let layouts = LayoutMap::new(target.layouts()?);
        let mut report = ReconstructReport::default();

        let mut resolved = Vec::with_capacity(document.slides.len());
        for record in &document.slides {
            let layout = match layouts.get(&record.layout_name) {
                Some(layout) => layout.clone(),
                None => {
                    report.layout_fallbacks += 1;
                    self.fallback_layout(&layouts, &record.layout_name)?
                }
            };
            resolved.push(layout);
        }

        for (record, layout) in document.slides.iter().zip(resolved.iter()) {
            let slide = target.add_slide(layout)?;
            report.slides_created += 1;
            self.fill_slide(record, slide, target, &mut report)?;
        }

        Ok(report)
    }

    fn fallback_layout<L: Clone>(&self, layouts: &LayoutMap<L>, name: &str) -> Result<L> {
        match self.policy {
            LayoutPolicy::Strict => Err(Error::UnresolvedLayout(name.to_string())),
            LayoutPolicy::Lenient => {
                let layout = layouts.fallback().cloned().ok_or(Error::NoLayouts)?;
                log::warn!(
                    "Layout '{}' not found in the target; using fallback layout {}",
                    name,
                    if layouts.len() > FALLBACK_LAYOUT_INDEX {
                        FALLBACK_LAYOUT_INDEX
                    } else {
                        0
                    }
                );
                Ok(layout)
            }
        }
    }

    /// Place each text-bearing shape of `record` onto the new slide.
    fn fill_slide<T: DeckTarget + ?Sized>(
        &self,
        record: &SlideRecord,
        slide: usize,
        target: &mut T,
        report: &mut ReconstructReport,
    ) -> Result<()> {
        for shape in &record.shapes {
            let text = match (&shape.text, shape.has_text_frame) {
                (Some(text), true) => text,
                _ => {
                    log::debug!(
                        "Slide {}: skipping non-text shape {} ({})",
                        slide,
                        shape.shape_index,
                        shape.shape_type
                    );
                    report.shapes_skipped += 1;
                    continue;
                }
            };

            let placeholders = target.placeholders(slide)?;
            match placeholders.iter().position(|p| p.is_empty_text_slot()) {
                Some(position) => {
                    target.set_placeholder_text(slide, position, text)?;
                    report.placeholders_filled += 1;
                }
                None => {
                    let frame = shape.geometry().or_text_box_defaults();
                    log::debug!(
                        "Slide {}: no empty placeholder for shape {}, adding text box",
                        slide,
                        shape.shape_index
                    );
                    target.add_text_box(slide, frame, text)?;
                    report.text_boxes_added += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryDeck;
    use crate::types::{Frame, ShapeRecord};

    fn text_shape(index: usize, text: &str) -> ShapeRecord {
        ShapeRecord {
            shape_index: index,
            shape_type: "PLACEHOLDER".to_string(),
            left: Some(0.5),
            top: Some(0.25),
            width: Some(9.0),
            height: Some(1.25),
            has_text_frame: true,
            text: Some(text.to_string()),
        }
    }

    fn slide(index: usize, layout: &str, shapes: Vec<ShapeRecord>) -> SlideRecord {
        SlideRecord {
            slide_index: index,
            layout_name: layout.to_string(),
            shapes,
        }
    }

    fn default_deck() -> MemoryDeck {
        MemoryDeck::new()
            .layout("Title Slide", &[0, 1])
            .layout("Title and Content", &[0, 1])
            .layout("Blank", &[])
    }

    #[test]
    fn test_two_slide_scenario() {
        let doc = PresentationDocument {
            slides: vec![
                slide(0, "Title Slide", vec![text_shape(0, "Hello")]),
                slide(1, "Blank", vec![]),
            ],
        };
        let mut deck = default_deck();

        let report = Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.placeholder_texts(0), vec!["Hello", ""]);
        assert!(deck.slides[1].placeholders.is_empty());
        assert!(deck.slides[1].text_boxes.is_empty());
        assert_eq!(report.slides_created, 2);
        assert_eq!(report.placeholders_filled, 1);
        assert_eq!(report.text_boxes_added, 0);
    }

    #[test]
    fn test_slide_order_follows_records_not_slide_index() {
        let doc = PresentationDocument {
            slides: vec![
                slide(7, "Blank", vec![]),
                slide(0, "Title Slide", vec![text_shape(0, "Second")]),
            ],
        };
        let mut deck = default_deck();

        Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        assert_eq!(deck.slides[0].layout, 2);
        assert_eq!(deck.slides[1].layout, 0);
        assert_eq!(deck.placeholder_texts(1)[0], "Second");
    }

    #[test]
    fn test_placeholders_are_never_reused() {
        let doc = PresentationDocument {
            slides: vec![slide(
                0,
                "Title and Content",
                vec![text_shape(0, "Title"), text_shape(1, "Body"), text_shape(2, "Extra")],
            )],
        };
        let mut deck = default_deck();

        let report = Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        assert_eq!(deck.placeholder_texts(0), vec!["Title", "Body"]);
        assert_eq!(deck.slides[0].text_boxes.len(), 1);
        assert_eq!(deck.slides[0].text_boxes[0].1, "Extra");
        assert_eq!(
            deck.slides[0].text_boxes[0].0,
            Frame {
                left: 0.5,
                top: 0.25,
                width: 9.0,
                height: 1.25
            }
        );
        assert_eq!(report.placeholders_filled, 2);
        assert_eq!(report.text_boxes_added, 1);
    }

    #[test]
    fn test_empty_text_does_not_consume_placeholder() {
        // An empty string leaves the placeholder empty, so the next shape
        // lands in the same placeholder.
        let doc = PresentationDocument {
            slides: vec![slide(
                0,
                "Title Slide",
                vec![text_shape(0, ""), text_shape(1, "Next")],
            )],
        };
        let mut deck = default_deck();

        Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        assert_eq!(deck.placeholder_texts(0), vec!["Next", ""]);
    }

    #[test]
    fn test_text_box_fallback_uses_defaults_for_missing_geometry() {
        let mut shape = text_shape(0, "Floating");
        shape.left = None;
        shape.top = None;
        shape.width = None;
        shape.height = None;
        let doc = PresentationDocument {
            slides: vec![slide(0, "Blank", vec![shape])],
        };
        let mut deck = default_deck();

        Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        let (frame, text) = &deck.slides[0].text_boxes[0];
        assert_eq!(text, "Floating");
        assert_eq!(
            *frame,
            Frame {
                left: 1.0,
                top: 1.0,
                width: 6.0,
                height: 1.0
            }
        );
    }

    #[test]
    fn test_non_text_placeholder_is_not_filled() {
        let mut deck = MemoryDeck::new().layout_with_slots("Picture", &[(1, false), (2, true)]);
        let doc = PresentationDocument {
            slides: vec![slide(0, "Picture", vec![text_shape(0, "Caption")])],
        };

        Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        assert_eq!(deck.placeholder_texts(0), vec!["", "Caption"]);
    }

    #[test]
    fn test_non_text_shapes_are_dropped() {
        let picture = ShapeRecord {
            shape_index: 0,
            shape_type: "PICTURE".to_string(),
            left: Some(1.0),
            top: Some(1.0),
            width: Some(2.0),
            height: Some(2.0),
            has_text_frame: false,
            text: None,
        };
        let doc = PresentationDocument {
            slides: vec![slide(0, "Blank", vec![picture])],
        };
        let mut deck = default_deck();

        let report = Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();

        assert!(deck.slides[0].text_boxes.is_empty());
        assert_eq!(report.shapes_skipped, 1);
    }

    #[test]
    fn test_layout_name_collision_last_wins() {
        let mut deck = MemoryDeck::new()
            .layout("X", &[0])
            .layout("Other", &[])
            .layout("X", &[0, 1, 2]);

        let map = LayoutMap::new(deck.layouts().unwrap());
        assert_eq!(map.get("X"), Some(&2));
        assert_eq!(map.len(), 3);

        let doc = PresentationDocument {
            slides: vec![slide(0, "X", vec![])],
        };
        Reconstructor::new().reconstruct(&doc, &mut deck).unwrap();
        assert_eq!(deck.slides[0].layout, 2);
        assert_eq!(deck.slides[0].placeholders.len(), 3);
    }

    #[test]
    fn test_strict_policy_aborts_before_adding_slides() {
        let doc = PresentationDocument {
            slides: vec![
                slide(0, "Title Slide", vec![text_shape(0, "ok")]),
                slide(1, "Missing Layout", vec![]),
            ],
        };
        let mut deck = default_deck();

        let err = Reconstructor::new().reconstruct(&doc, &mut deck).unwrap_err();

        match err {
            Error::UnresolvedLayout(name) => assert_eq!(name, "Missing Layout"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(deck.slides.is_empty());
    }

    #[test]
    fn test_lenient_policy_uses_layout_one() {
        let doc = PresentationDocument {
            slides: vec![slide(0, "Missing Layout", vec![text_shape(0, "Fallback")])],
        };
        let mut deck = default_deck();

        let report = Reconstructor::new()
            .with_policy(LayoutPolicy::Lenient)
            .reconstruct(&doc, &mut deck)
            .unwrap();

        assert_eq!(deck.slides[0].layout, 1);
        assert_eq!(deck.placeholder_texts(0)[0], "Fallback");
        assert_eq!(report.layout_fallbacks, 1);
    }

    #[test]
    fn test_lenient_policy_falls_back_to_layout_zero() {
        let doc = PresentationDocument {
            slides: vec![slide(0, "Missing Layout", vec![])],
        };
        let mut deck = MemoryDeck::new().layout("Only", &[0]);

        Reconstructor::new()
            .with_policy(LayoutPolicy::Lenient)
            .reconstruct(&doc, &mut deck)
            .unwrap();

        assert_eq!(deck.slides[0].layout, 0);
    }

    #[test]
    fn test_lenient_policy_without_layouts_fails() {
        let doc = PresentationDocument {
            slides: vec![slide(0, "Anything", vec![])],
        };
        let mut deck = MemoryDeck::new();

        let err = Reconstructor::new()
            .with_policy(LayoutPolicy::Lenient)
            .reconstruct(&doc, &mut deck)
            .unwrap_err();

        assert!(matches!(err, Error::NoLayouts));
    }
}
