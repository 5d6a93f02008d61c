// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Slide identifier slugs.
//!
//! Slide ids are human-readable slugs derived from the prompt so they
//! can be typed back into `move`/`remove`/`edit` invocations. Collisions
//! are resolved with a numeric suffix; ids are never reused.

use std::collections::HashSet;

/// Maximum number of prompt words folded into a suggested id.
const MAX_SLUG_WORDS: usize = 4;

/// Maximum length of a suggested id, in bytes.
const MAX_SLUG_LEN: usize = 40;

/// Suggest a slide id from a prompt.
///
/// Lowercases the first few words, keeps ASCII alphanumerics, and joins
/// them with hyphens. Falls back to `"slide"` when the prompt carries no
/// usable characters.
pub fn suggest_id(prompt: &str) -> String {
    let mut words = Vec::new();
    for word in prompt.split_whitespace().take(MAX_SLUG_WORDS) {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if !cleaned.is_empty() {
            words.push(cleaned);
        }
    }

    let mut slug = words.join("-");
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("slide");
    }
    slug
}

/// Resolve `base` against already-taken ids, appending `-2`, `-3`, ...
/// until the candidate is free.
pub fn dedupe_id(base: &str, taken: &HashSet<&str>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut counter = 2usize;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_id_from_prompt() {
        assert_eq!(
            suggest_id("Company vision overview for 2026"),
            "company-vision-overview-for"
        );
        assert_eq!(suggest_id("  Market, opportunity!  "), "market-opportunity");
    }

    #[test]
    fn test_suggest_id_fallback() {
        assert_eq!(suggest_id(""), "slide");
        assert_eq!(suggest_id("!!! ???"), "slide");
    }

    #[test]
    fn test_dedupe_id_appends_counter() {
        let taken: HashSet<&str> = ["intro", "intro-2"].into_iter().collect();
        assert_eq!(dedupe_id("intro", &taken), "intro-3");
        assert_eq!(dedupe_id("outro", &taken), "outro");
    }
}
