//! Core types and conversion policy for presentation documents.
//!
//! Converts between a live presentation (reached through the [`DeckSource`]
//! and [`DeckTarget`] capability traits) and a normalized JSON interchange
//! document, and assembles lyric decks from song-lyric JSON files.

pub mod deck;
pub mod error;
pub mod extract;
pub mod lyric;
pub mod reconstruct;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use deck::{DeckSource, DeckTarget, PlaceholderSlot, ShapeInfo};
pub use error::{Error, Result};
pub use extract::Extractor;
pub use lyric::{load_round, LyricData, LyricDeckBuilder};
pub use reconstruct::{LayoutMap, LayoutPolicy, ReconstructReport, Reconstructor};
pub use types::{Frame, Geometry, PresentationDocument, ShapeRecord, SlideRecord, EMU_PER_INCH};
