// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `edit` command: run an engine edit against an existing slide.
//!
//! The result never lands on the slide directly; it is parked as a
//! draft and only an approval (here, or later through `review`) copies
//! it onto the source entry.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cli::{self, GenerationOptions};
use crate::engine::{self, artifacts, SlideEngine};
use crate::error::{Error, Result};
use crate::io::config;
use crate::models::deck::Deck;
use crate::models::drafts::{self, ReviewDecision};
use crate::models::style;

pub fn run(
    dir: &Path,
    target: &str,
    instruction: &str,
    options: &GenerationOptions,
    no_interactive: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let mut deck = cli::open_deck(dir)?;
    let engine = cli::build_engine(&deck.document().engine, options.model, &config)?;

    let source_id = resolve_target(&deck, target)?;
    let source = deck.find(&source_id)?;
    let source_image_path = source
        .image_path
        .clone()
        .ok_or_else(|| Error::Validation(format!("slide '{source_id}' has no image to edit")))?;
    let source_image = fs::read(&source_image_path)
        .map_err(|_| Error::not_found("slide image", source_image_path.clone()))?;

    let mut resolved = cli::resolve_project_style(dir, options.style_id.as_deref())?;
    style::merge_reference_paths(&mut resolved, &super::generate::path_strings(&options.references));

    let request = engine::build_request(
        instruction,
        &resolved,
        &options.reference_files,
        options.aspect_ratio,
        true,
    )?;
    log::info!("Editing slide '{source_id}' with {}", options.model);
    let result = engine.edit(&source_image, &request)?;

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.default_output_dir));
    let image_path = artifacts::persist(&result, &output_dir, "draft")?;

    let mut metadata =
        super::generate::enrich_metadata(result.metadata.clone(), &result.image_bytes, options);
    metadata.insert("edited_from".to_string(), serde_json::json!(source_image_path));

    let draft = drafts::propose(
        &mut deck,
        &source_id,
        result.revised_prompt.clone(),
        Some(image_path.display().to_string()),
        metadata,
    )?;
    let draft_id = draft.id.clone();
    cli::save_deck(dir, &deck)?;

    println!("Drafted edit '{draft_id}' for slide '{source_id}'");
    println!("Saved to {}", image_path.display());

    if no_interactive {
        println!("Draft left pending; resolve it with `slidegen review {draft_id} --approve|--reject`");
        return Ok(());
    }

    match ask_decision()? {
        ReviewDecision::Approve => {
            drafts::approve(&mut deck, &draft_id)?;
            cli::save_deck(dir, &deck)?;
            println!("Approved: slide '{source_id}' now carries the edit");
        }
        ReviewDecision::Reject => {
            drafts::reject(&mut deck, &draft_id)?;
            cli::save_deck(dir, &deck)?;
            println!("Rejected: slide '{source_id}' is unchanged");
        }
        ReviewDecision::Postpone => {
            println!("Draft left pending; resolve it with `slidegen review {draft_id} --approve|--reject`");
        }
    }
    Ok(())
}

/// Resolve an edit target: a slide id, or an image path recorded on one
/// of the slides.
fn resolve_target(deck: &Deck, target: &str) -> Result<String> {
    if deck.contains(target) {
        return Ok(target.to_string());
    }
    let matched = deck.entries().iter().find(|slide| {
        !slide.is_draft && slide.image_path.as_deref() == Some(target)
    });
    match matched {
        Some(slide) => Ok(slide.id.clone()),
        None => Err(Error::not_found("slide", target)),
    }
}

/// Ask the reviewer what to do with the fresh draft.
fn ask_decision() -> Result<ReviewDecision> {
    loop {
        print!("Apply this edit? [a]pprove / [r]eject / [p]ostpone ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "a" | "approve" | "y" | "yes" => return Ok(ReviewDecision::Approve),
            "r" | "reject" | "n" | "no" => return Ok(ReviewDecision::Reject),
            "p" | "postpone" | "" => return Ok(ReviewDecision::Postpone),
            other => println!("Unrecognized answer '{other}'"),
        }
    }
}
