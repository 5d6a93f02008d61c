// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command-line interface.
//!
//! One subcommand per project operation; every mutating command runs a
//! full load-mutate-save cycle against the project in the current
//! directory, so nothing survives in memory between invocations.

pub mod deck_ops;
pub mod edit;
pub mod generate;
pub mod init;
pub mod review;
pub mod setup;
pub mod style_cmd;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::engine::gemini::GeminiEngine;
use crate::engine::{AspectRatio, ModelSelector};
use crate::error::{Error, Result};
use crate::io::config::{self, GlobalConfig};
use crate::io::styles::{JsonStyleStore, GLOBAL_STYLES_FILE};
use crate::models::deck::Deck;
use crate::models::project::SlideEntry;
use crate::models::style::{self, ResolvedStyle};

/// Generate and manage AI-powered presentation slides.
#[derive(Debug, Parser)]
#[command(name = "slidegen", version, about)]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a new slides project in the current directory.
    Init {
        /// Optional project name/folder (creates ./NAME/slides.json when given).
        name: Option<String>,
        /// Overwrite an existing project state file.
        #[arg(long)]
        force: bool,
    },
    /// Generate a new slide and append it to the deck.
    Generate {
        /// Prompt used to generate the slide.
        prompt: String,
        #[command(flatten)]
        options: GenerationOptions,
    },
    /// Edit an existing slide; the result becomes a draft awaiting review.
    Edit {
        /// Slide ID (or the slide's image path) to edit.
        target: String,
        /// Edit instruction.
        instruction: String,
        #[command(flatten)]
        options: GenerationOptions,
        /// Leave the draft pending instead of prompting for a decision.
        #[arg(long)]
        no_interactive: bool,
    },
    /// List pending drafts, or resolve one.
    Review {
        /// Draft ID or the ID of the slide it would replace.
        id: Option<String>,
        /// Approve the draft onto its source slide.
        #[arg(long, conflicts_with = "reject")]
        approve: bool,
        /// Discard the draft, leaving the source untouched.
        #[arg(long)]
        reject: bool,
    },
    /// Move a slide to a new 1-based position.
    Move {
        /// Slide ID to move.
        slide_id: String,
        /// New 1-based position.
        new_pos: usize,
    },
    /// Remove a slide (and any pending draft of it) from the deck.
    Remove {
        /// Slide ID to remove.
        slide_id: String,
    },
    /// Show the deck in presentation order.
    List,
    /// Remove every slide from the project after confirmation.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Inspect or update the project style.
    #[command(subcommand)]
    Style(style_cmd::StyleCommand),
    /// Store engine credentials and defaults in the user config.
    Setup {
        /// Engine the API key belongs to.
        #[arg(long, default_value = "gemini")]
        engine: String,
        /// API key to store.
        #[arg(long)]
        api_key: Option<String>,
        /// Default directory for generated images.
        #[arg(long)]
        default_output_dir: Option<String>,
    },
}

/// Options shared by `generate` and `edit`.
#[derive(Debug, Clone, clap::Args)]
pub struct GenerationOptions {
    /// Style preset ID override.
    #[arg(long)]
    pub style_id: Option<String>,
    /// Additional reference image paths (repeatable).
    #[arg(long = "references")]
    pub references: Vec<PathBuf>,
    /// Text files injected into the prompt as factual context (repeatable).
    #[arg(long = "reference-file")]
    pub reference_files: Vec<PathBuf>,
    /// Engine model selector.
    #[arg(long, default_value_t = ModelSelector::Pro)]
    pub model: ModelSelector,
    /// Slide image aspect ratio.
    #[arg(long, default_value_t = AspectRatio::R16x9)]
    pub aspect_ratio: AspectRatio,
    /// Directory where generated images are saved.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Dispatch a parsed invocation. The project directory is always the
/// process working directory.
pub fn run(cli: Cli) -> Result<()> {
    let dir = PathBuf::from(".");
    match cli.command {
        Command::Init { name, force } => init::run(&dir, name.as_deref(), force),
        Command::Generate { prompt, options } => generate::run(&dir, &prompt, &options),
        Command::Edit {
            target,
            instruction,
            options,
            no_interactive,
        } => edit::run(&dir, &target, &instruction, &options, no_interactive),
        Command::Review { id, approve, reject } => {
            review::run(&dir, id.as_deref(), approve, reject)
        }
        Command::Move { slide_id, new_pos } => deck_ops::run_move(&dir, &slide_id, new_pos),
        Command::Remove { slide_id } => deck_ops::run_remove(&dir, &slide_id),
        Command::List => deck_ops::run_list(&dir),
        Command::Clear { yes } => deck_ops::run_clear(&dir, yes),
        Command::Style(command) => style_cmd::run(&dir, command),
        Command::Setup {
            engine,
            api_key,
            default_output_dir,
        } => setup::run(&engine, api_key, default_output_dir),
    }
}

/// Resolve the effective style for a project directory: project
/// `style.json` merged over the user's global preset registry.
pub fn resolve_project_style(dir: &Path, style_id: Option<&str>) -> Result<ResolvedStyle> {
    let project_style = crate::io::styles::load_project_style(dir)?;
    let store = global_style_store()?;
    style::resolve(project_style.as_ref(), style_id, &store)
}

/// The user's global style preset registry.
pub fn global_style_store() -> Result<JsonStyleStore> {
    let dir = config::config_dir().ok_or_else(|| {
        Error::Validation("cannot locate a home directory for the style registry".to_string())
    })?;
    Ok(JsonStyleStore::new(dir.join(GLOBAL_STYLES_FILE)))
}

/// Construct the engine selected by the project document.
pub fn build_engine(
    document_engine: &str,
    model: ModelSelector,
    config: &GlobalConfig,
) -> Result<GeminiEngine> {
    if document_engine != "gemini" {
        return Err(Error::not_found("engine", document_engine));
    }
    let api_key = config::api_key_for(config, "gemini").ok_or_else(|| {
        Error::Validation(
            "missing Gemini API key; run `slidegen setup --api-key ...` or set GEMINI_API_KEY"
                .to_string(),
        )
    })?;
    Ok(GeminiEngine::new(api_key, model)?)
}

/// Ask a yes/no question on the terminal; anything but `y`/`yes` is no.
pub fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Print the deck as an order/id/path table.
pub fn print_slides(slides: &[&SlideEntry]) {
    if slides.is_empty() {
        println!("(no slides)");
        return;
    }
    let id_width = slides
        .iter()
        .map(|slide| slide.id.len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    println!("{:>5}  {:<id_width$}  Path", "Order", "ID");
    for slide in slides {
        println!(
            "{:>5}  {:<id_width$}  {}",
            slide.order,
            slide.id,
            slide.image_path.as_deref().unwrap_or("-"),
        );
    }
}

/// Load the deck for the current directory.
pub fn open_deck(dir: &Path) -> Result<Deck> {
    Ok(Deck::new(crate::io::state::load(dir)?))
}

/// Persist the deck back to disk.
pub fn save_deck(dir: &Path, deck: &Deck) -> Result<()> {
    crate::io::state::save(dir, deck.document())
}
