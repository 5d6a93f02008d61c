// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `generate` command: create a slide and append it to the deck.

use std::path::{Path, PathBuf};

use crate::cli::{self, GenerationOptions};
use crate::engine::{self, artifacts, SlideEngine};
use crate::error::Result;
use crate::io::config;
use crate::models::project::SlideMetadata;
use crate::models::style;

pub fn run(dir: &Path, prompt: &str, options: &GenerationOptions) -> Result<()> {
    let config = config::load_config()?;
    let mut deck = cli::open_deck(dir)?;
    let engine = cli::build_engine(&deck.document().engine, options.model, &config)?;

    let mut resolved = cli::resolve_project_style(dir, options.style_id.as_deref())?;
    style::merge_reference_paths(&mut resolved, &path_strings(&options.references));

    let request = engine::build_request(
        prompt,
        &resolved,
        &options.reference_files,
        options.aspect_ratio,
        false,
    )?;
    log::info!(
        "Generating slide with {} ({} reference image(s))",
        options.model,
        request.references.len()
    );
    let result = engine.generate(&request)?;

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.default_output_dir));
    let image_path = artifacts::persist(&result, &output_dir, "slide")?;

    let metadata = enrich_metadata(result.metadata.clone(), &result.image_bytes, options);
    let entry = deck.add_slide(
        result.revised_prompt.clone(),
        Some(image_path.display().to_string()),
        metadata,
    );
    cli::save_deck(dir, &deck)?;

    println!("Generated slide '{}' at position {}", entry.id, entry.order);
    println!("Saved to {}", image_path.display());
    Ok(())
}

/// Record artifact dimensions and any reference files alongside the
/// provenance the engine returned.
pub fn enrich_metadata(
    mut metadata: SlideMetadata,
    image_bytes: &[u8],
    options: &GenerationOptions,
) -> SlideMetadata {
    if let Some((width, height)) = artifacts::probe_dimensions(image_bytes) {
        metadata.insert("width".to_string(), serde_json::json!(width));
        metadata.insert("height".to_string(), serde_json::json!(height));
    }
    if !options.reference_files.is_empty() {
        metadata.insert(
            "reference_files".to_string(),
            serde_json::json!(path_strings(&options.reference_files)),
        );
    }
    metadata
}

pub fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect()
}
