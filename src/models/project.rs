// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state document.
//!
//! This module defines the persisted shape of a slides project: the
//! document header plus the ordered sequence of slide entries, including
//! pending draft entries awaiting review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk format version of `slides.json`.
pub const SCHEMA_VERSION: u32 = 1;

/// Opaque provenance data attached to a slide by the engine.
pub type SlideMetadata = serde_json::Map<String, serde_json::Value>;

/// One record in the project state document: a deck position, or a
/// pending draft linked to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideEntry {
    /// Unique within the project, stable for the slide's lifetime.
    pub id: String,
    /// 1-based presentation position; dense and unique across non-draft
    /// entries.
    pub order: usize,
    /// Latest instruction that produced the current image.
    pub prompt: String,
    /// Path to the generated artifact; absent until the first
    /// successful generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "SlideMetadata::is_empty")]
    pub metadata: SlideMetadata,
    /// Pending edit awaiting review; excluded from ordering and export.
    #[serde(default)]
    pub is_draft: bool,
    /// For drafts, the id of the canonical slide this would replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_of: Option<String>,
}

/// Complete project state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub schema_version: u32,
    pub name: String,
    /// Set once at project creation, never modified afterwards.
    pub created_at: DateTime<Utc>,
    /// Selected generation engine identifier.
    pub engine: String,
    #[serde(default)]
    pub slides: Vec<SlideEntry>,
}

impl ProjectDocument {
    /// Create an empty project with the given name and engine.
    pub fn new(name: String, engine: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name,
            created_at: Utc::now(),
            engine,
            slides: Vec::new(),
        }
    }
}
