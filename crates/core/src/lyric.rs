//! Song lyrics and lyric deck assembly.
//!
//! A lyric file is JSON with a title, the song form (the order sections are
//! sung in) and the lines of each section:
//!
//! ```json
//! {
//!     "title": "Amazing Grace",
//!     "song_form": ["verse1", "chorus", "verse1"],
//!     "lyric": {
//!         "verse1": ["Amazing grace how sweet the sound", "That saved a wretch like me"],
//!         "chorus": ["..."]
//!     }
//! }
//! ```
//!
//! Every lyric line becomes one slide made from the song layout, carrying the
//! song title and the line. A slide from the separator layout follows each song.

use crate::deck::DeckTarget;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One song's lyrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricData {
    pub title: String,

    /// Section names in the order they are sung; sections may repeat.
    pub song_form: Vec<String>,

    /// Lines of each section.
    #[serde(rename = "lyric")]
    pub lyric_dict: HashMap<String, Vec<String>>,
}

impl LyricData {
    /// Parse a lyric from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lines of the song in sung order.
    pub fn lines(&self) -> Result<Vec<&str>> {
        let mut lines = Vec::new();
        for section in &self.song_form {
            let section_lines =
                self.lyric_dict
                    .get(section)
                    .ok_or_else(|| Error::MissingSection {
                        title: self.title.clone(),
                        section: section.clone(),
                    })?;
            lines.extend(section_lines.iter().map(String::as_str));
        }
        Ok(lines)
    }
}

/// Load every `*.json` lyric in `dir`, ordered by file name.
pub fn load_round(dir: impl AsRef<Path>) -> Result<Vec<LyricData>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::MissingFile(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut songs = Vec::with_capacity(files.len());
    for path in files {
        let json = std::fs::read_to_string(&path)?;
        let song = LyricData::from_json_str(&json).map_err(|e| match e {
            Error::MalformedInterchange(reason) => {
                Error::MalformedInterchange(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;
        log::debug!("Loaded lyric '{}' from {}", song.title, path.display());
        songs.push(song);
    }

    Ok(songs)
}

/// Assembles lyric slides into a deck.
#[derive(Debug, Clone)]
pub struct LyricDeckBuilder {
    song_layout: usize,
    separator_layout: usize,
    title_placeholder: u32,
    lyric_placeholder: u32,
}

impl Default for LyricDeckBuilder {
    fn default() -> Self {
        Self {
            song_layout: 0,
            separator_layout: 1,
            title_placeholder: 0,
            lyric_placeholder: 10,
        }
    }
}

impl LyricDeckBuilder {
    /// Create a builder with the reference deck's conventions: layout 0 for
    /// lyric slides, layout 1 between songs, title in placeholder idx 0 and
    /// the lyric line in placeholder idx 10.
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the layout used for lyric slides.
    pub fn with_song_layout(mut self, index: usize) -> Self {
        self.song_layout = index;
        self
    }

    /// Position of the layout used for the slide after each song.
    pub fn with_separator_layout(mut self, index: usize) -> Self {
        self.separator_layout = index;
        self
    }

    /// Placeholder idx receiving the song title.
    pub fn with_title_placeholder(mut self, idx: u32) -> Self {
        self.title_placeholder = idx;
        self
    }

    /// Placeholder idx receiving the lyric line.
    pub fn with_lyric_placeholder(mut self, idx: u32) -> Self {
        self.lyric_placeholder = idx;
        self
    }

    /// Append slides for `songs` to `target`; returns the number of slides added.
    pub fn build<T: DeckTarget + ?Sized>(&self, songs: &[LyricData], target: &mut T) -> Result<usize> {
        let layouts = target.layouts()?;
        let song_layout = layout_at(&layouts, self.song_layout)?;
        let separator_layout = layout_at(&layouts, self.separator_layout)?;

        let mut added = 0;
        for song in songs {
            log::info!("---> {}", song.title);

            for line in song.lines()? {
                let slide = target.add_slide(&song_layout)?;
                set_by_idx(target, slide, self.title_placeholder, &song.title)?;
                set_by_idx(target, slide, self.lyric_placeholder, line)?;
                added += 1;
            }

            target.add_slide(&separator_layout)?;
            added += 1;
        }

        Ok(added)
    }
}

fn layout_at<L: Clone>(layouts: &[(String, L)], index: usize) -> Result<L> {
    layouts
        .get(index)
        .map(|(_, layout)| layout.clone())
        .ok_or(Error::LayoutIndexOutOfRange {
            index,
            available: layouts.len(),
        })
}

fn set_by_idx<T: DeckTarget + ?Sized>(target: &mut T, slide: usize, idx: u32, text: &str) -> Result<()> {
    let position = target
        .placeholders(slide)?
        .iter()
        .position(|p| p.idx == idx)
        .ok_or(Error::MissingPlaceholder { slide, idx })?;
    target.set_placeholder_text(slide, position, text)
}
