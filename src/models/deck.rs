// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory slide registry.
//!
//! [`Deck`] wraps a loaded [`ProjectDocument`] and implements the
//! canonical slide operations: lookup, ordering, insert/move/remove.
//! Draft bookkeeping lives in [`crate::models::drafts`]; the registry
//! itself only renumbers and orders non-draft entries. The caller is
//! responsible for persisting the document after mutations.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::project::{ProjectDocument, SlideEntry, SlideMetadata};
use crate::util::slug;

/// Registry view over a project state document.
#[derive(Debug, Clone)]
pub struct Deck {
    document: ProjectDocument,
}

impl Deck {
    pub fn new(document: ProjectDocument) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    /// All entries, drafts included, in storage order.
    pub fn entries(&self) -> &[SlideEntry] {
        &self.document.slides
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<SlideEntry> {
        &mut self.document.slides
    }

    /// Number of non-draft slides.
    pub fn len(&self) -> usize {
        self.document
            .slides
            .iter()
            .filter(|slide| !slide.is_draft)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find an entry (draft or canonical) by id.
    pub fn find(&self, id: &str) -> Result<&SlideEntry> {
        self.document
            .slides
            .iter()
            .find(|slide| slide.id == id)
            .ok_or_else(|| Error::not_found("slide", id))
    }

    pub fn find_mut(&mut self, id: &str) -> Result<&mut SlideEntry> {
        self.document
            .slides
            .iter_mut()
            .find(|slide| slide.id == id)
            .ok_or_else(|| Error::not_found("slide", id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.document.slides.iter().any(|slide| slide.id == id)
    }

    /// Non-draft entries sorted by `order`; drafts are excluded.
    pub fn ordered_slides(&self) -> Vec<&SlideEntry> {
        let mut slides: Vec<&SlideEntry> = self
            .document
            .slides
            .iter()
            .filter(|slide| !slide.is_draft)
            .collect();
        slides.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        slides
    }

    /// Append a canonical slide at the end of the deck.
    ///
    /// Assigns the next order value and a fresh prompt-derived id,
    /// collision-checked against every existing id (drafts included).
    pub fn add_slide(
        &mut self,
        prompt: String,
        image_path: Option<String>,
        metadata: SlideMetadata,
    ) -> SlideEntry {
        let entry = SlideEntry {
            id: self.fresh_id(&slug::suggest_id(&prompt)),
            order: self.next_order(),
            prompt,
            image_path,
            metadata,
            is_draft: false,
            draft_of: None,
        };
        self.document.slides.push(entry.clone());
        entry
    }

    /// Move a non-draft slide to a 1-based position and renumber the
    /// deck densely. Returns `(previous_position, new_position)`.
    pub fn move_slide(&mut self, id: &str, new_position: usize) -> Result<(usize, usize)> {
        let ordered_ids: Vec<String> = self
            .ordered_slides()
            .iter()
            .map(|slide| slide.id.clone())
            .collect();
        let count = ordered_ids.len();
        let current_index = ordered_ids
            .iter()
            .position(|slide_id| slide_id == id)
            .ok_or_else(|| Error::not_found("slide", id))?;
        if new_position < 1 || new_position > count {
            return Err(Error::Range {
                position: new_position,
                max: count,
            });
        }

        let mut reordered = ordered_ids;
        let moving = reordered.remove(current_index);
        reordered.insert(new_position - 1, moving);
        self.apply_order(&reordered);
        Ok((current_index + 1, new_position))
    }

    /// Remove a slide by id and renumber the rest densely.
    ///
    /// Removing a canonical slide also drops any draft entries whose
    /// `draft_of` referenced it, so no dangling drafts survive.
    pub fn remove_slide(&mut self, id: &str) -> Result<SlideEntry> {
        let index = self
            .document
            .slides
            .iter()
            .position(|slide| slide.id == id)
            .ok_or_else(|| Error::not_found("slide", id))?;
        let removed = self.document.slides.remove(index);
        if !removed.is_draft {
            self.document
                .slides
                .retain(|slide| slide.draft_of.as_deref() != Some(id));
            self.renumber();
        }
        Ok(removed)
    }

    /// Remove every entry, drafts included. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.document.slides.len();
        self.document.slides.clear();
        removed
    }

    /// Generate an id that is unique across all entries.
    pub(crate) fn fresh_id(&self, base: &str) -> String {
        let taken: HashSet<&str> = self
            .document
            .slides
            .iter()
            .map(|slide| slide.id.as_str())
            .collect();
        slug::dedupe_id(base, &taken)
    }

    fn next_order(&self) -> usize {
        self.document
            .slides
            .iter()
            .filter(|slide| !slide.is_draft)
            .map(|slide| slide.order)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Rewrite non-draft order values as `1..=N` following the given id
    /// sequence. Drafts keep their stored order untouched.
    fn apply_order(&mut self, ordered_ids: &[String]) {
        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(slide) = self
                .document
                .slides
                .iter_mut()
                .find(|slide| &slide.id == id)
            {
                slide.order = index + 1;
            }
        }
    }

    /// Compact non-draft orders into dense `1..=N` keeping the current
    /// relative ordering.
    pub(crate) fn renumber(&mut self) {
        let ordered_ids: Vec<String> = self
            .ordered_slides()
            .iter()
            .map(|slide| slide.id.clone())
            .collect();
        self.apply_order(&ordered_ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn empty_deck() -> Deck {
        Deck::new(ProjectDocument {
            schema_version: crate::models::project::SCHEMA_VERSION,
            name: "test".to_string(),
            created_at: Utc::now(),
            engine: "gemini".to_string(),
            slides: Vec::new(),
        })
    }

    fn seeded_deck() -> Deck {
        let mut deck = empty_deck();
        deck.add_slide("Company vision overview".to_string(), None, SlideMetadata::new());
        deck.add_slide("Market opportunity".to_string(), None, SlideMetadata::new());
        deck.add_slide("Execution plan".to_string(), None, SlideMetadata::new());
        deck
    }

    fn orders(deck: &Deck) -> Vec<usize> {
        deck.ordered_slides().iter().map(|slide| slide.order).collect()
    }

    #[test]
    fn test_add_assigns_dense_orders_and_unique_ids() {
        let mut deck = empty_deck();
        let first = deck
            .add_slide("Intro slide".to_string(), None, SlideMetadata::new())
            .id
            .clone();
        let second = deck
            .add_slide("Intro slide".to_string(), None, SlideMetadata::new())
            .id
            .clone();

        assert_ne!(first, second);
        assert_eq!(orders(&deck), vec![1, 2]);
    }

    #[test]
    fn test_move_slide_repositions_and_renumbers() {
        let mut deck = seeded_deck();
        let moving = deck.ordered_slides()[1].id.clone();

        let (from, to) = deck.move_slide(&moving, 1).unwrap();

        assert_eq!((from, to), (2, 1));
        assert_eq!(deck.ordered_slides()[0].id, moving);
        assert_eq!(orders(&deck), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_slide_rejects_out_of_range_position() {
        let mut deck = seeded_deck();
        let id = deck.ordered_slides()[0].id.clone();

        assert!(matches!(
            deck.move_slide(&id, 4),
            Err(Error::Range { position: 4, max: 3 })
        ));
        assert!(matches!(
            deck.move_slide(&id, 0),
            Err(Error::Range { position: 0, max: 3 })
        ));
    }

    #[test]
    fn test_move_slide_unknown_id() {
        let mut deck = seeded_deck();
        assert!(matches!(
            deck.move_slide("missing", 1),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_slide_compacts_ordering() {
        let mut deck = seeded_deck();
        let middle = deck.ordered_slides()[1].id.clone();

        let removed = deck.remove_slide(&middle).unwrap();

        assert_eq!(removed.id, middle);
        assert_eq!(deck.len(), 2);
        assert_eq!(orders(&deck), vec![1, 2]);
    }

    #[test]
    fn test_order_stays_dense_across_operation_sequences() {
        let mut deck = seeded_deck();
        let first = deck.ordered_slides()[0].id.clone();
        deck.remove_slide(&first).unwrap();
        deck.add_slide("Budget".to_string(), None, SlideMetadata::new());
        let last = deck.ordered_slides()[2].id.clone();
        deck.move_slide(&last, 1).unwrap();
        deck.add_slide("Closing".to_string(), None, SlideMetadata::new());

        let observed = orders(&deck);
        assert_eq!(observed, (1..=deck.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut deck = seeded_deck();
        assert_eq!(deck.clear(), 3);
        assert!(deck.is_empty());
    }
}
