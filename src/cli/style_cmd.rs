// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `style` command group: inspect and update the project style and the
//! global preset registry.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::cli;
use crate::error::{Error, Result};
use crate::io::styles::{self, StyleStore};
use crate::models::style::ProjectStyle;

#[derive(Debug, Subcommand)]
pub enum StyleCommand {
    /// Print the project style and the resolved effective style.
    Show,
    /// Update fields of the project style.
    Set {
        /// Base prompt appended to every generation request.
        #[arg(long)]
        base_prompt: Option<String>,
        /// Negative prompt ("avoid ...") for every request.
        #[arg(long)]
        negative_prompt: Option<String>,
        /// Add a reference image path (repeatable).
        #[arg(long = "add-reference")]
        add_references: Vec<PathBuf>,
        /// Annotate a reference image, as PATH=COMMENT (repeatable).
        #[arg(long = "comment")]
        comments: Vec<String>,
    },
    /// Point the project at a global preset (use `default` to unset).
    Use {
        /// Preset name from the global registry.
        style_id: String,
    },
    /// Publish the project style as a global preset.
    Save {
        /// Preset name to store it under.
        name: String,
    },
    /// List the global preset names.
    Presets,
}

pub fn run(dir: &Path, command: StyleCommand) -> Result<()> {
    match command {
        StyleCommand::Show => show(dir),
        StyleCommand::Set {
            base_prompt,
            negative_prompt,
            add_references,
            comments,
        } => set(dir, base_prompt, negative_prompt, add_references, comments),
        StyleCommand::Use { style_id } => use_preset(dir, &style_id),
        StyleCommand::Save { name } => save_preset(dir, &name),
        StyleCommand::Presets => list_presets(),
    }
}

fn show(dir: &Path) -> Result<()> {
    match styles::load_project_style(dir)? {
        Some(style) => {
            println!("Project style ({}):", styles::style_path(dir).display());
            print_fields(&style);
        }
        None => println!("No project style file."),
    }

    let resolved = cli::resolve_project_style(dir, None)?;
    if resolved.is_empty() {
        println!("Effective style: (none)");
        return Ok(());
    }
    println!("Effective style:");
    println!("  preset:          {}", resolved.style_id.as_deref().unwrap_or("-"));
    println!("  base_prompt:     {}", non_empty(&resolved.base_prompt));
    println!("  negative_prompt: {}", non_empty(&resolved.negative_prompt));
    println!("  references:      {}", resolved.reference_images.join(", "));
    Ok(())
}

fn print_fields(style: &ProjectStyle) {
    println!("  preset:          {}", style.style_id.as_deref().unwrap_or("-"));
    println!("  base_prompt:     {}", non_empty(&style.style.base_prompt));
    println!("  negative_prompt: {}", non_empty(&style.style.negative_prompt));
    println!("  references:      {}", style.style.reference_images.join(", "));
    for (path, comment) in &style.style.reference_comments {
        println!("    {path}: {comment}");
    }
}

fn non_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn set(
    dir: &Path,
    base_prompt: Option<String>,
    negative_prompt: Option<String>,
    add_references: Vec<PathBuf>,
    comments: Vec<String>,
) -> Result<()> {
    let mut style = styles::load_project_style(dir)?.unwrap_or_default();

    if let Some(base_prompt) = base_prompt {
        style.style.base_prompt = base_prompt;
    }
    if let Some(negative_prompt) = negative_prompt {
        style.style.negative_prompt = negative_prompt;
    }
    for reference in add_references {
        if !reference.is_file() {
            return Err(Error::not_found(
                "reference image",
                reference.display().to_string(),
            ));
        }
        let path = reference.display().to_string();
        if !style.style.reference_images.contains(&path) {
            style.style.reference_images.push(path);
        }
    }
    for comment in comments {
        let (path, text) = comment.split_once('=').ok_or_else(|| {
            Error::Validation(format!("comment '{comment}' is not in PATH=COMMENT form"))
        })?;
        style
            .style
            .reference_comments
            .insert(path.trim().to_string(), text.trim().to_string());
    }

    styles::save_project_style(dir, &style)?;
    println!("Updated {}", styles::style_path(dir).display());
    Ok(())
}

fn use_preset(dir: &Path, style_id: &str) -> Result<()> {
    let cleaned = style_id.trim();
    let mut style = styles::load_project_style(dir)?.unwrap_or_default();

    if cleaned.is_empty() || cleaned == "default" {
        style.style_id = None;
        styles::save_project_style(dir, &style)?;
        println!("Project no longer references a global preset.");
        return Ok(());
    }

    // Fail early rather than at the next generate.
    let store = cli::global_style_store()?;
    if store.get(cleaned)?.is_none() {
        return Err(Error::not_found("style preset", cleaned));
    }
    style.style_id = Some(cleaned.to_string());
    styles::save_project_style(dir, &style)?;
    println!("Project now uses preset '{cleaned}'.");
    Ok(())
}

fn save_preset(dir: &Path, name: &str) -> Result<()> {
    let style = styles::load_project_style(dir)?
        .ok_or_else(|| Error::not_found("project style file", styles::style_path(dir).display().to_string()))?;
    if style.style.is_empty() {
        return Err(Error::Validation(
            "project style is empty; nothing to publish".to_string(),
        ));
    }
    let mut store = cli::global_style_store()?;
    store.put(name, style.style)?;
    println!("Published project style as preset '{name}'.");
    Ok(())
}

fn list_presets() -> Result<()> {
    let store = cli::global_style_store()?;
    let names = store.names()?;
    if names.is_empty() {
        println!("No global presets defined.");
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
