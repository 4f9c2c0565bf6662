//! CLI tool for converting presentations to and from JSON and assembling
//! lyric decks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deck_core::{
    load_round, Extractor, LayoutPolicy, LyricDeckBuilder, PresentationDocument, Reconstructor,
};
use deck_pptx::Presentation;
use std::path::{Path, PathBuf};

/// Convert PowerPoint files to and from JSON.
#[derive(Parser, Debug)]
#[command(name = "deckconv")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract slides, shapes and text of a .pptx file into JSON
    ToJson {
        /// Input PowerPoint file (.pptx)
        input: PathBuf,

        /// Output JSON file (default: input name with .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rebuild a .pptx file from JSON
    FromJson {
        /// Input JSON file
        input: PathBuf,

        /// Output PowerPoint file (default: input name with .pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Presentation whose layouts are used; its slides are removed first
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Use a fallback layout instead of failing on unknown layout names
        #[arg(long)]
        lenient: bool,
    },

    /// Remove every slide from a .pptx file
    Clear {
        /// PowerPoint file to clear
        input: PathBuf,

        /// Where to save the result (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a lyric deck from a directory of lyric JSON files
    Lyrics {
        /// Directory holding one JSON file per song
        dir: PathBuf,

        /// Reference deck providing the layouts; its slides are replaced
        #[arg(short, long)]
        template: PathBuf,

        /// Where to save the deck (default: overwrite the template)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::ToJson { input, output } => to_json(&input, output.as_deref()),
        Command::FromJson {
            input,
            output,
            template,
            lenient,
        } => from_json(&input, output.as_deref(), template.as_deref(), lenient),
        Command::Clear { input, output } => clear(&input, output.as_deref()),
        Command::Lyrics {
            dir,
            template,
            output,
        } => lyrics(&dir, &template, output.as_deref()),
    }
}

/// Extract `input` into interchange JSON.
fn to_json(input: &Path, output: Option<&Path>) -> Result<()> {
    let presentation = Presentation::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;

    let output_path = get_output_path(input, output, "json");
    let document = Extractor::new()
        .extract_to_file(&presentation, &output_path)
        .with_context(|| format!("Failed to extract {}", input.display()))?;

    log::info!(
        "Extracted {} slides ({} text shapes) to {}",
        document.slides.len(),
        document.text_shape_count(),
        output_path.display()
    );
    Ok(())
}

/// Rebuild a presentation from interchange JSON.
fn from_json(input: &Path, output: Option<&Path>, template: Option<&Path>, lenient: bool) -> Result<()> {
    let document = PresentationDocument::load(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let mut target = match template {
        Some(path) => {
            let mut target = Presentation::open(path)
                .with_context(|| format!("Failed to open template {}", path.display()))?;
            target.clear_all_slides()?;
            target
        }
        None => Presentation::new()?,
    };

    let policy = if lenient {
        LayoutPolicy::Lenient
    } else {
        LayoutPolicy::Strict
    };
    let report = Reconstructor::new()
        .with_policy(policy)
        .reconstruct(&document, &mut target)
        .with_context(|| format!("Failed to rebuild {}", input.display()))?;

    let output_path = get_output_path(input, output, "pptx");
    target
        .save(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    log::info!(
        "Wrote {} slides to {} ({} placeholders filled, {} text boxes, {} shapes skipped, {} layout fallbacks)",
        report.slides_created,
        output_path.display(),
        report.placeholders_filled,
        report.text_boxes_added,
        report.shapes_skipped,
        report.layout_fallbacks
    );
    Ok(())
}

/// Remove every slide from `input`.
fn clear(input: &Path, output: Option<&Path>) -> Result<()> {
    let mut presentation = Presentation::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let removed = presentation.clear_all_slides()?;

    let output_path = output.unwrap_or(input);
    presentation
        .save(output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    log::info!("Removed {} slides from {}", removed, output_path.display());
    Ok(())
}

/// Replace the slides of `template` with a lyric deck built from `dir`.
fn lyrics(dir: &Path, template: &Path, output: Option<&Path>) -> Result<()> {
    let songs = load_round(dir).with_context(|| format!("Failed to load lyrics from {}", dir.display()))?;

    let mut presentation = Presentation::open(template)
        .with_context(|| format!("Failed to open {}", template.display()))?;
    presentation.clear_all_slides()?;

    let added = LyricDeckBuilder::new()
        .build(&songs, &mut presentation)
        .context("Failed to build the lyric deck")?;

    let output_path = output.unwrap_or(template);
    presentation
        .save(output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    log::info!(
        "Wrote {} slides for {} songs to {}",
        added,
        songs.len(),
        output_path.display()
    );
    Ok(())
}

/// Determine the output path: the explicit one, else the input's name with
/// extension `ext` next to the input.
fn get_output_path(input: &Path, output: Option<&Path>, ext: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension(ext),
    }
}
