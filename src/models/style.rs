// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Style definitions and resolution.
//!
//! A project carries an optional style file (`style.json`) and may point
//! at a named preset in the global style store. Resolution merges the
//! preset beneath the project overrides into one effective style used to
//! condition every generation/edit request.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::styles::StyleStore;

/// Reusable style payload shared by project and global styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    #[serde(default)]
    pub base_prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    /// Reference image paths supplied to the engine as visual conditioning.
    #[serde(default)]
    pub reference_images: Vec<String>,
    /// Free-text annotations keyed by reference image path.
    #[serde(default)]
    pub reference_comments: BTreeMap<String, String>,
}

impl StyleDefinition {
    /// Check whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.base_prompt.trim().is_empty()
            && self.negative_prompt.trim().is_empty()
            && self.reference_images.is_empty()
            && self.reference_comments.is_empty()
    }
}

/// Project style file model stored in `./style.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStyle {
    #[serde(flatten)]
    pub style: StyleDefinition,
    /// Optional reference to a named preset in the global store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
}

/// Effective style merged from a global preset and project overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub style_id: Option<String>,
    pub base_prompt: String,
    pub negative_prompt: String,
    pub reference_images: Vec<String>,
    pub reference_comments: BTreeMap<String, String>,
}

impl ResolvedStyle {
    /// Check whether resolution produced any usable style context.
    pub fn is_empty(&self) -> bool {
        self.style_id.is_none()
            && self.base_prompt.trim().is_empty()
            && self.negative_prompt.trim().is_empty()
            && self.reference_images.is_empty()
            && self.reference_comments.is_empty()
    }
}

/// Merge a global named preset with project-level overrides.
///
/// Preset fields act as defaults; every non-empty project field wins
/// field-by-field, so an absent project value never erases a preset
/// value. Reference image lists concatenate (preset first, then
/// project) and are de-duplicated preserving first occurrence. An
/// explicit `style_id` argument (e.g. from `--style-id`) overrides the
/// one recorded in the project style.
pub fn resolve(
    project_style: Option<&ProjectStyle>,
    style_id: Option<&str>,
    store: &dyn StyleStore,
) -> Result<ResolvedStyle> {
    let requested = normalize_style_id(style_id);
    let effective_id = requested
        .or_else(|| project_style.and_then(|style| normalize_style_id(style.style_id.as_deref())));

    let preset = match &effective_id {
        Some(id) => Some(
            store
                .get(id)?
                .ok_or_else(|| Error::not_found("style preset", id.clone()))?,
        ),
        None => None,
    };
    let preset = preset.unwrap_or_default();
    let project = project_style
        .map(|style| style.style.clone())
        .unwrap_or_default();

    let mut reference_comments = preset.reference_comments;
    reference_comments.extend(project.reference_comments);

    Ok(ResolvedStyle {
        style_id: effective_id,
        base_prompt: override_non_empty(preset.base_prompt, project.base_prompt),
        negative_prompt: override_non_empty(preset.negative_prompt, project.negative_prompt),
        reference_images: unique_paths(
            preset
                .reference_images
                .iter()
                .chain(project.reference_images.iter()),
        ),
        reference_comments,
    })
}

/// Merge ad-hoc reference image paths (e.g. `--references`) into a
/// resolved style, keeping the existing entries first.
pub fn merge_reference_paths(style: &mut ResolvedStyle, references: &[String]) {
    if references.is_empty() {
        return;
    }
    style.reference_images =
        unique_paths(style.reference_images.iter().chain(references.iter()));
}

fn normalize_style_id(style_id: Option<&str>) -> Option<String> {
    let cleaned = style_id?.trim();
    if cleaned.is_empty() || cleaned == "default" {
        return None;
    }
    Some(cleaned.to_string())
}

fn override_non_empty(preset: String, project: String) -> String {
    if project.trim().is_empty() {
        preset
    } else {
        project
    }
}

fn unique_paths<'a>(paths: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    for path in paths {
        let trimmed = path.trim();
        if trimmed.is_empty() || !seen.insert(trimmed) {
            continue;
        }
        result.push(trimmed.to_string());
    }
    result
}
