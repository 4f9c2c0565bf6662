//! Error types for presentation conversion and deck assembly.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting or assembling presentations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The source presentation, JSON file or lyric directory does not exist.
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The interchange or lyric JSON failed to parse or lacks required keys.
    #[error("Malformed interchange file: {0}")]
    MalformedInterchange(String),

    /// A slide record names a layout the target does not have.
    #[error("Layout '{0}' does not exist in the target layout set")]
    UnresolvedLayout(String),

    /// A layout was requested by position and the position is out of range.
    #[error("Layout index {index} is out of range ({available} layouts available)")]
    LayoutIndexOutOfRange { index: usize, available: usize },

    /// The target presentation has no layouts at all.
    #[error("The target presentation has no slide layouts")]
    NoLayouts,

    /// A slide has no placeholder with the requested idx.
    #[error("Slide {slide} has no placeholder with idx {idx}")]
    MissingPlaceholder { slide: usize, idx: u32 },

    /// A placeholder position is past the end of the slide's placeholders.
    #[error("Slide {slide} has no placeholder at position {position}")]
    PlaceholderOutOfRange { slide: usize, position: usize },

    /// A song form names a section the lyric has no lines for.
    #[error("Song '{title}' has no lyric section '{section}'")]
    MissingSection { title: String, section: String },

    /// A slide index does not exist in the presentation.
    #[error("Slide {0} does not exist")]
    SlideOutOfRange(usize),

    /// Failed to interpret the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInterchange(err.to_string())
    }
}
