// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Draft/review workflow.
//!
//! Edit requests never mutate a canonical slide directly. The engine
//! result is parked as a draft entry (`is_draft = true`) linked to its
//! source via `draft_of`, and only an approval copies it onto the
//! source. This module owns all draft bookkeeping; the registry in
//! [`crate::models::deck`] only handles canonical slides.

use crate::error::{Error, Result};
use crate::models::deck::Deck;
use crate::models::project::{SlideEntry, SlideMetadata};

/// Metadata key marking an entry as awaiting review. Stripped when the
/// draft is approved onto its source.
pub const REVIEW_STATUS_KEY: &str = "review_status";

/// Outcome chosen for a proposed draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
    Postpone,
}

/// Park an engine edit result as a draft for `source_id`.
///
/// A pending draft for the same source is superseded: the old draft is
/// dropped and the new one takes its place. Fails with `NotFound` when
/// the source is missing, and rejects drafts-of-drafts.
pub fn propose(
    deck: &mut Deck,
    source_id: &str,
    prompt: String,
    image_path: Option<String>,
    mut metadata: SlideMetadata,
) -> Result<SlideEntry> {
    let source = deck.find(source_id)?;
    if source.is_draft {
        return Err(Error::Validation(format!(
            "slide '{source_id}' is itself a draft and cannot be edited"
        )));
    }
    let source_id = source.id.clone();
    let source_order = source.order;

    // Supersede any pending draft for this source.
    deck.entries_mut()
        .retain(|slide| slide.draft_of.as_deref() != Some(source_id.as_str()));

    metadata.insert(
        REVIEW_STATUS_KEY.to_string(),
        serde_json::Value::String("pending".to_string()),
    );
    let draft = SlideEntry {
        id: deck.fresh_id(&format!("{source_id}-draft")),
        order: source_order,
        prompt,
        image_path,
        metadata,
        is_draft: true,
        draft_of: Some(source_id),
    };
    deck.entries_mut().push(draft.clone());
    Ok(draft)
}

/// Approve a draft: copy its prompt, image path, and metadata onto the
/// source slide, then delete the draft entry. Returns the updated
/// source entry.
pub fn approve(deck: &mut Deck, draft_id: &str) -> Result<SlideEntry> {
    let draft = take_draft(deck, draft_id)?;
    let source_id = draft
        .draft_of
        .clone()
        .ok_or_else(|| Error::Validation(format!("draft '{draft_id}' has no source slide")))?;

    let source = match deck.find_mut(&source_id) {
        Ok(source) => source,
        Err(err) => {
            // Put the draft back so a failed approval changes nothing.
            deck.entries_mut().push(draft);
            return Err(err);
        }
    };

    let mut metadata = draft.metadata;
    metadata.remove(REVIEW_STATUS_KEY);
    source.prompt = draft.prompt;
    source.image_path = draft.image_path;
    source.metadata = metadata;
    Ok(source.clone())
}

/// Reject a draft: delete it without touching the source slide.
pub fn reject(deck: &mut Deck, draft_id: &str) -> Result<SlideEntry> {
    take_draft(deck, draft_id)
}

/// All pending drafts in storage order.
pub fn pending(deck: &Deck) -> Vec<&SlideEntry> {
    deck.entries()
        .iter()
        .filter(|slide| slide.is_draft)
        .collect()
}

/// The pending draft for a canonical slide, when one exists.
pub fn find_for_source<'a>(deck: &'a Deck, source_id: &str) -> Option<&'a SlideEntry> {
    deck.entries()
        .iter()
        .find(|slide| slide.is_draft && slide.draft_of.as_deref() == Some(source_id))
}

/// Remove and return the draft entry with the given id.
fn take_draft(deck: &mut Deck, draft_id: &str) -> Result<SlideEntry> {
    let index = deck
        .entries()
        .iter()
        .position(|slide| slide.id == draft_id && slide.is_draft)
        .ok_or_else(|| Error::not_found("draft", draft_id))?;
    Ok(deck.entries_mut().remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectDocument;
    use chrono::Utc;

    fn deck_with_slides() -> Deck {
        let mut deck = Deck::new(ProjectDocument {
            schema_version: crate::models::project::SCHEMA_VERSION,
            name: "test".to_string(),
            created_at: Utc::now(),
            engine: "gemini".to_string(),
            slides: Vec::new(),
        });
        deck.add_slide(
            "Company vision overview".to_string(),
            Some("slides/1.png".to_string()),
            SlideMetadata::new(),
        );
        deck.add_slide(
            "Market opportunity".to_string(),
            Some("slides/2.png".to_string()),
            SlideMetadata::new(),
        );
        deck
    }

    #[test]
    fn test_propose_links_draft_to_source() {
        let mut deck = deck_with_slides();
        let source_id = deck.ordered_slides()[0].id.clone();

        let draft = propose(
            &mut deck,
            &source_id,
            "Updated vision slide".to_string(),
            Some("slides/1-draft.png".to_string()),
            SlideMetadata::new(),
        )
        .unwrap();

        assert!(draft.is_draft);
        assert_eq!(draft.draft_of.as_deref(), Some(source_id.as_str()));
        assert_eq!(
            draft.metadata.get(REVIEW_STATUS_KEY),
            Some(&serde_json::Value::String("pending".to_string()))
        );
        // Drafts never appear in the presentation ordering.
        assert_eq!(deck.ordered_slides().len(), 2);
    }

    #[test]
    fn test_second_proposal_supersedes_pending_draft() {
        let mut deck = deck_with_slides();
        let source_id = deck.ordered_slides()[0].id.clone();

        let first = propose(&mut deck, &source_id, "v1".to_string(), None, SlideMetadata::new())
            .unwrap();
        let second = propose(&mut deck, &source_id, "v2".to_string(), None, SlideMetadata::new())
            .unwrap();

        assert!(!deck.contains(&first.id) || first.id == second.id);
        let open = pending(&deck);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].prompt, "v2");
    }

    #[test]
    fn test_approve_copies_draft_onto_source() {
        let mut deck = deck_with_slides();
        let source_id = deck.ordered_slides()[0].id.clone();
        let mut metadata = SlideMetadata::new();
        metadata.insert("model".to_string(), serde_json::json!("gemini-pro"));
        let draft = propose(
            &mut deck,
            &source_id,
            "Updated vision".to_string(),
            Some("slides/1-v2.png".to_string()),
            metadata,
        )
        .unwrap();

        let updated = approve(&mut deck, &draft.id).unwrap();

        assert_eq!(updated.id, source_id);
        assert_eq!(updated.prompt, "Updated vision");
        assert_eq!(updated.image_path.as_deref(), Some("slides/1-v2.png"));
        assert_eq!(updated.metadata.get("model"), Some(&serde_json::json!("gemini-pro")));
        assert!(updated.metadata.get(REVIEW_STATUS_KEY).is_none());
        assert!(pending(&deck).is_empty());
        assert!(find_for_source(&deck, &source_id).is_none());
    }

    #[test]
    fn test_reject_leaves_source_untouched() {
        let mut deck = deck_with_slides();
        let source_id = deck.ordered_slides()[0].id.clone();
        let before = deck.find(&source_id).unwrap().clone();
        let draft = propose(&mut deck, &source_id, "nope".to_string(), None, SlideMetadata::new())
            .unwrap();

        let rejected = reject(&mut deck, &draft.id).unwrap();

        assert_eq!(rejected.id, draft.id);
        assert_eq!(deck.find(&source_id).unwrap(), &before);
        assert!(pending(&deck).is_empty());
    }

    #[test]
    fn test_removing_source_drops_orphaned_draft() {
        let mut deck = deck_with_slides();
        let source_id = deck.ordered_slides()[0].id.clone();
        propose(&mut deck, &source_id, "draft".to_string(), None, SlideMetadata::new()).unwrap();

        deck.remove_slide(&source_id).unwrap();

        assert!(pending(&deck).is_empty());
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.ordered_slides()[0].order, 1);
    }

    #[test]
    fn test_cannot_draft_a_draft() {
        let mut deck = deck_with_slides();
        let source_id = deck.ordered_slides()[0].id.clone();
        let draft = propose(&mut deck, &source_id, "draft".to_string(), None, SlideMetadata::new())
            .unwrap();

        let result = propose(&mut deck, &draft.id, "nested".to_string(), None, SlideMetadata::new());

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_approve_unknown_draft() {
        let mut deck = deck_with_slides();
        assert!(matches!(
            approve(&mut deck, "missing"),
            Err(Error::NotFound { .. })
        ));
    }
}
