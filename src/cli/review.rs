// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `review` command: list or resolve pending drafts.

use std::path::Path;

use crate::cli;
use crate::error::{Error, Result};
use crate::models::deck::Deck;
use crate::models::drafts;

pub fn run(dir: &Path, id: Option<&str>, approve: bool, reject: bool) -> Result<()> {
    let mut deck = cli::open_deck(dir)?;

    let Some(id) = id else {
        list_pending(&deck);
        return Ok(());
    };

    if !approve && !reject {
        return Err(Error::Validation(
            "pass --approve or --reject to resolve a draft".to_string(),
        ));
    }

    let draft_id = resolve_draft_id(&deck, id)?;
    if approve {
        let updated = drafts::approve(&mut deck, &draft_id)?;
        cli::save_deck(dir, &deck)?;
        println!("Approved draft '{draft_id}' onto slide '{}'", updated.id);
    } else {
        let removed = drafts::reject(&mut deck, &draft_id)?;
        cli::save_deck(dir, &deck)?;
        println!(
            "Rejected draft '{draft_id}'; slide '{}' is unchanged",
            removed.draft_of.as_deref().unwrap_or("?")
        );
    }
    Ok(())
}

fn list_pending(deck: &Deck) {
    let pending = drafts::pending(deck);
    if pending.is_empty() {
        println!("No drafts pending review.");
        return;
    }
    println!("Pending drafts:");
    for draft in pending {
        println!(
            "  {}  (replaces '{}')  {}",
            draft.id,
            draft.draft_of.as_deref().unwrap_or("?"),
            draft.image_path.as_deref().unwrap_or("-"),
        );
    }
}

/// Accept either a draft id or the id of its source slide.
fn resolve_draft_id(deck: &Deck, id: &str) -> Result<String> {
    if let Ok(entry) = deck.find(id) {
        if entry.is_draft {
            return Ok(entry.id.clone());
        }
        if let Some(draft) = drafts::find_for_source(deck, &entry.id) {
            return Ok(draft.id.clone());
        }
    }
    Err(Error::not_found("draft", id))
}
