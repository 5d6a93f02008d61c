// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Deck ordering commands: `move`, `remove`, `list`, `clear`.

use std::path::Path;

use crate::cli;
use crate::error::Result;
use crate::models::drafts;

pub fn run_move(dir: &Path, slide_id: &str, new_pos: usize) -> Result<()> {
    let mut deck = cli::open_deck(dir)?;
    let (from, to) = deck.move_slide(slide_id, new_pos)?;
    if from == to {
        println!("Slide '{slide_id}' is already at position {to}");
        return Ok(());
    }
    cli::save_deck(dir, &deck)?;
    log::info!("Moved slide '{slide_id}' from {from} to {to}");

    println!("Moved slide '{slide_id}' from position {from} to {to}");
    cli::print_slides(&deck.ordered_slides());
    Ok(())
}

pub fn run_remove(dir: &Path, slide_id: &str) -> Result<()> {
    let mut deck = cli::open_deck(dir)?;
    let removed = deck.remove_slide(slide_id)?;
    cli::save_deck(dir, &deck)?;
    log::info!("Removed slide '{slide_id}', {} left", deck.len());

    println!(
        "Removed slide '{}' (was at position {})",
        removed.id, removed.order
    );
    cli::print_slides(&deck.ordered_slides());
    Ok(())
}

pub fn run_list(dir: &Path) -> Result<()> {
    let deck = cli::open_deck(dir)?;
    let document = deck.document();
    println!(
        "Project '{}' (engine: {}, created {})",
        document.name,
        document.engine,
        document.created_at.format("%Y-%m-%d")
    );
    cli::print_slides(&deck.ordered_slides());
    let pending = drafts::pending(&deck);
    if !pending.is_empty() {
        println!(
            "{} draft(s) pending review; see `slidegen review`",
            pending.len()
        );
    }
    Ok(())
}

pub fn run_clear(dir: &Path, yes: bool) -> Result<()> {
    let mut deck = cli::open_deck(dir)?;
    let total = deck.entries().len();
    if total == 0 {
        println!("No slides found in project.");
        return Ok(());
    }

    if !yes {
        cli::print_slides(&deck.ordered_slides());
        let confirmed = cli::confirm(&format!(
            "Delete all {total} slides? This cannot be undone."
        ))?;
        if !confirmed {
            println!("Cancelled; no slides were deleted.");
            return Ok(());
        }
    }

    deck.clear();
    cli::save_deck(dir, &deck)?;
    log::info!("Cleared {total} slides");
    println!("Cleared {total} slides.");
    Ok(())
}
