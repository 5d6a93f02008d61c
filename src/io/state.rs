// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state persistence.
//!
//! This module owns the `slides.json` document on disk: loading,
//! invariant validation, atomic saving, and one-shot migration of the
//! legacy `slides.yaml` format.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::project::{ProjectDocument, SlideEntry, SlideMetadata, SCHEMA_VERSION};
use crate::util::slug;

/// Current state file name inside a project directory.
pub const STATE_FILE: &str = "slides.json";

/// Legacy state file name, migrated on first load.
pub const LEGACY_STATE_FILE: &str = "slides.yaml";

/// Path of the state file inside a project directory.
pub fn state_path(dir: &Path) -> PathBuf {
    dir.join(STATE_FILE)
}

/// Load the project state from a directory.
///
/// Reads `slides.json` when present. Otherwise a legacy `slides.yaml`
/// is parsed, rewritten as `slides.json`, and deleted. Fails with
/// `NotFound` when neither file exists. Every loaded document is
/// validated before it is returned.
pub fn load(dir: &Path) -> Result<ProjectDocument> {
    let json_path = state_path(dir);
    if json_path.exists() {
        let contents = fs::read_to_string(&json_path)?;
        let document: ProjectDocument =
            serde_json::from_str(&contents).map_err(|source| Error::Json {
                path: json_path.clone(),
                source,
            })?;
        validate(&document)?;
        return Ok(document);
    }

    let yaml_path = dir.join(LEGACY_STATE_FILE);
    if yaml_path.exists() {
        return migrate_legacy(dir, &yaml_path);
    }

    Err(Error::not_found(
        "project state file",
        json_path.display().to_string(),
    ))
}

/// Serialize the full document atomically.
///
/// The document is validated, written to a temp file in the same
/// directory, and renamed over `slides.json`, so an interrupted save
/// never leaves a truncated state file behind.
pub fn save(dir: &Path, document: &ProjectDocument) -> Result<()> {
    validate(document)?;
    let path = state_path(dir);
    let tmp_path = dir.join(format!("{STATE_FILE}.tmp"));
    let json = serde_json::to_string_pretty(document).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&tmp_path, json + "\n")?;
    fs::rename(&tmp_path, &path)?;
    log::debug!("Saved project state to {}", path.display());
    Ok(())
}

/// Check the document invariants, naming the violated one on failure.
///
/// Rejected: unknown schema version, duplicate ids, non-dense or
/// duplicate `order` among non-draft entries, drafts whose `draft_of`
/// is absent or does not reference a canonical slide, and canonical
/// entries carrying a `draft_of`.
pub fn validate(document: &ProjectDocument) -> Result<()> {
    if document.schema_version != SCHEMA_VERSION {
        return Err(Error::Validation(format!(
            "unsupported schema_version {} (expected {SCHEMA_VERSION})",
            document.schema_version
        )));
    }

    let mut ids: HashSet<&str> = HashSet::new();
    for slide in &document.slides {
        if !ids.insert(slide.id.as_str()) {
            return Err(Error::Validation(format!(
                "duplicate slide id '{}'",
                slide.id
            )));
        }
    }

    let mut orders: Vec<usize> = document
        .slides
        .iter()
        .filter(|slide| !slide.is_draft)
        .map(|slide| slide.order)
        .collect();
    orders.sort_unstable();
    for (index, order) in orders.iter().enumerate() {
        if *order != index + 1 {
            return Err(Error::Validation(format!(
                "slide orders are not dense 1..{}: found order {order}",
                orders.len()
            )));
        }
    }

    let canonical_ids: HashSet<&str> = document
        .slides
        .iter()
        .filter(|slide| !slide.is_draft)
        .map(|slide| slide.id.as_str())
        .collect();
    for slide in &document.slides {
        match (&slide.draft_of, slide.is_draft) {
            (Some(source), true) => {
                if !canonical_ids.contains(source.as_str()) {
                    return Err(Error::Validation(format!(
                        "draft '{}' references unknown slide '{source}'",
                        slide.id
                    )));
                }
            }
            (Some(_), false) => {
                return Err(Error::Validation(format!(
                    "canonical slide '{}' carries a draft_of reference",
                    slide.id
                )));
            }
            (None, true) => {
                return Err(Error::Validation(format!(
                    "draft '{}' has no draft_of reference",
                    slide.id
                )));
            }
            (None, false) => {}
        }
    }

    Ok(())
}

/// Legacy YAML slide entry. Early project files carried neither ids nor
/// explicit ordering, so every field except the prompt is optional.
#[derive(Debug, Deserialize)]
struct LegacySlideEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    order: Option<usize>,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    image_path: Option<String>,
    #[serde(default)]
    metadata: SlideMetadata,
    #[serde(default)]
    is_draft: bool,
    #[serde(default)]
    draft_of: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyDocument {
    name: String,
    created_at: DateTime<Utc>,
    engine: String,
    #[serde(default)]
    slides: Vec<LegacySlideEntry>,
}

/// Parse `slides.yaml`, rewrite it as `slides.json`, and delete the
/// legacy file once the rewrite has landed.
fn migrate_legacy(dir: &Path, yaml_path: &Path) -> Result<ProjectDocument> {
    let contents = fs::read_to_string(yaml_path)?;
    let legacy: LegacyDocument =
        serde_yaml::from_str(&contents).map_err(|source| Error::Yaml {
            path: yaml_path.to_path_buf(),
            source,
        })?;

    let mut taken: HashSet<String> = legacy
        .slides
        .iter()
        .filter_map(|slide| slide.id.clone())
        .collect();
    let mut slides = Vec::with_capacity(legacy.slides.len());
    for entry in legacy.slides {
        let id = match entry.id {
            Some(id) => id,
            None => {
                let base = slug::suggest_id(&entry.prompt);
                let taken_refs: HashSet<&str> = taken.iter().map(String::as_str).collect();
                let fresh = slug::dedupe_id(&base, &taken_refs);
                taken.insert(fresh.clone());
                fresh
            }
        };
        slides.push(SlideEntry {
            id,
            order: entry.order.unwrap_or(0),
            prompt: entry.prompt,
            image_path: entry.image_path,
            metadata: entry.metadata,
            is_draft: entry.is_draft,
            draft_of: entry.draft_of,
        });
    }

    // Legacy files without explicit orders relied on sequence position;
    // renumber canonical entries densely keeping (order, position).
    let mut canonical_indices: Vec<usize> = (0..slides.len())
        .filter(|&index| !slides[index].is_draft)
        .collect();
    canonical_indices.sort_by_key(|&index| (slides[index].order, index));
    for (position, &index) in canonical_indices.iter().enumerate() {
        slides[index].order = position + 1;
    }

    let document = ProjectDocument {
        schema_version: SCHEMA_VERSION,
        name: legacy.name,
        created_at: legacy.created_at,
        engine: legacy.engine,
        slides,
    };
    validate(&document)?;
    save(dir, &document)?;
    fs::remove_file(yaml_path)?;
    log::info!(
        "Migrated legacy {} to {}",
        yaml_path.display(),
        state_path(dir).display()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_document() -> ProjectDocument {
        let mut document = ProjectDocument::new("demo".to_string(), "gemini".to_string());
        document.slides.push(SlideEntry {
            id: "vision".to_string(),
            order: 1,
            prompt: "Company vision".to_string(),
            image_path: Some("slides/1.png".to_string()),
            metadata: SlideMetadata::new(),
            is_draft: false,
            draft_of: None,
        });
        document.slides.push(SlideEntry {
            id: "market".to_string(),
            order: 2,
            prompt: "Market opportunity".to_string(),
            image_path: None,
            metadata: SlideMetadata::new(),
            is_draft: false,
            draft_of: None,
        });
        document
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let document = sample_document();

        save(dir.path(), &document).unwrap();
        let loaded = load(dir.path()).unwrap();
        save(dir.path(), &loaded).unwrap();
        let reloaded = load(dir.path()).unwrap();

        assert_eq!(document, loaded);
        assert_eq!(loaded, reloaded);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        save(dir.path(), &sample_document()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![STATE_FILE.to_string()]);
    }

    #[test]
    fn test_load_missing_project() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(dir.path()),
            Err(Error::NotFound { kind: "project state file", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut document = sample_document();
        document.slides[1].id = "vision".to_string();

        let result = validate(&document);

        assert!(matches!(result, Err(Error::Validation(message)) if message.contains("duplicate")));
    }

    #[test]
    fn test_validate_rejects_non_dense_orders() {
        let mut document = sample_document();
        document.slides[1].order = 3;

        assert!(matches!(validate(&document), Err(Error::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_dangling_draft() {
        let mut document = sample_document();
        document.slides.push(SlideEntry {
            id: "vision-draft".to_string(),
            order: 1,
            prompt: "draft".to_string(),
            image_path: None,
            metadata: SlideMetadata::new(),
            is_draft: true,
            draft_of: Some("gone".to_string()),
        });

        let result = validate(&document);

        assert!(matches!(result, Err(Error::Validation(message)) if message.contains("unknown slide")));
    }

    #[test]
    fn test_validate_rejects_unknown_schema_version() {
        let mut document = sample_document();
        document.schema_version = 99;

        assert!(matches!(validate(&document), Err(Error::Validation(_))));
    }

    #[test]
    fn test_legacy_yaml_migrates_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = "\
name: legacy-deck
created_at: 2024-11-05T12:30:00+00:00
engine: gemini
slides:
  - prompt: Company vision overview
    image_path: slides/1.png
  - prompt: Market opportunity
";
        fs::write(dir.path().join(LEGACY_STATE_FILE), yaml).unwrap();

        let document = load(dir.path()).unwrap();

        assert_eq!(document.schema_version, SCHEMA_VERSION);
        assert_eq!(document.name, "legacy-deck");
        assert_eq!(
            document.created_at,
            Utc.with_ymd_and_hms(2024, 11, 5, 12, 30, 0).unwrap()
        );
        assert_eq!(document.slides.len(), 2);
        assert_eq!(document.slides[0].order, 1);
        assert_eq!(document.slides[1].order, 2);
        assert_ne!(document.slides[0].id, document.slides[1].id);
        // The rewrite replaces the legacy file.
        assert!(state_path(dir.path()).exists());
        assert!(!dir.path().join(LEGACY_STATE_FILE).exists());

        // A second load reads the migrated JSON directly.
        let reloaded = load(dir.path()).unwrap();
        assert_eq!(document, reloaded);
    }

    #[test]
    fn test_legacy_migration_keeps_explicit_orders() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = "\
name: legacy-deck
created_at: 2024-11-05T12:30:00Z
engine: gemini
slides:
  - id: closing
    order: 5
    prompt: Closing
  - id: opening
    order: 2
    prompt: Opening
";
        fs::write(dir.path().join(LEGACY_STATE_FILE), yaml).unwrap();

        let document = load(dir.path()).unwrap();

        let ids: Vec<&str> = document.slides.iter().map(|slide| slide.id.as_str()).collect();
        assert_eq!(ids, vec!["closing", "opening"]);
        // Sparse legacy orders compact to dense 1..N by rank.
        assert_eq!(document.slides[0].order, 2);
        assert_eq!(document.slides[1].order, 1);
    }
}
