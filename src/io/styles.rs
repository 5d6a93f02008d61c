// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Style persistence.
//!
//! Two files back the style system: the project-level `style.json` and
//! the user-scoped `styles.json` preset registry. The registry is
//! consumed through the [`StyleStore`] trait so the resolver never
//! depends on the file system directly; tests substitute the in-memory
//! implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::style::{ProjectStyle, StyleDefinition};

/// Project style file name inside a project directory.
pub const STYLE_FILE: &str = "style.json";

/// Global preset registry file name inside the user config directory.
pub const GLOBAL_STYLES_FILE: &str = "styles.json";

/// Named style preset registry.
pub trait StyleStore {
    /// Fetch a preset by name, `None` when absent.
    fn get(&self, name: &str) -> Result<Option<StyleDefinition>>;
    /// Create or replace a preset.
    fn put(&mut self, name: &str, style: StyleDefinition) -> Result<()>;
    /// All preset names, sorted.
    fn names(&self) -> Result<Vec<String>>;
}

/// On-disk payload of the global preset registry.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GlobalStyles {
    #[serde(default)]
    styles: BTreeMap<String, StyleDefinition>,
}

/// File-backed [`StyleStore`] over `styles.json`.
///
/// The whole registry is small; each operation reads or rewrites the
/// file in full. A missing file reads as an empty registry.
pub struct JsonStyleStore {
    path: PathBuf,
}

impl JsonStyleStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<GlobalStyles> {
        if !self.path.exists() {
            return Ok(GlobalStyles::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, styles: &GlobalStyles) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(styles).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json + "\n")?;
        Ok(())
    }
}

impl StyleStore for JsonStyleStore {
    fn get(&self, name: &str) -> Result<Option<StyleDefinition>> {
        Ok(self.read()?.styles.get(name).cloned())
    }

    fn put(&mut self, name: &str, style: StyleDefinition) -> Result<()> {
        let mut styles = self.read()?;
        styles.styles.insert(name.to_string(), style);
        self.write(&styles)?;
        log::info!("Saved style preset '{name}' to {}", self.path.display());
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.read()?.styles.keys().cloned().collect())
    }
}

/// In-memory [`StyleStore`] used by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStyleStore {
    styles: BTreeMap<String, StyleDefinition>,
}

#[cfg(test)]
impl MemoryStyleStore {
    pub fn insert(&mut self, name: &str, style: StyleDefinition) {
        self.styles.insert(name.to_string(), style);
    }
}

#[cfg(test)]
impl StyleStore for MemoryStyleStore {
    fn get(&self, name: &str) -> Result<Option<StyleDefinition>> {
        Ok(self.styles.get(name).cloned())
    }

    fn put(&mut self, name: &str, style: StyleDefinition) -> Result<()> {
        self.styles.insert(name.to_string(), style);
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.styles.keys().cloned().collect())
    }
}

/// Path of the project style file inside a project directory.
pub fn style_path(dir: &Path) -> PathBuf {
    dir.join(STYLE_FILE)
}

/// Load the project style when present.
pub fn load_project_style(dir: &Path) -> Result<Option<ProjectStyle>> {
    let path = style_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    let style = serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    Ok(Some(style))
}

/// Persist the project style to `style.json`.
pub fn save_project_style(dir: &Path, style: &ProjectStyle) -> Result<()> {
    let path = style_path(dir);
    let json = serde_json::to_string_pretty(style).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json + "\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStyleStore::new(dir.path().join(GLOBAL_STYLES_FILE));

        assert_eq!(store.get("corporate").unwrap(), None);
        store
            .put(
                "corporate",
                StyleDefinition {
                    base_prompt: "clean corporate look".to_string(),
                    ..StyleDefinition::default()
                },
            )
            .unwrap();

        let fetched = store.get("corporate").unwrap().unwrap();
        assert_eq!(fetched.base_prompt, "clean corporate look");
        assert_eq!(store.names().unwrap(), vec!["corporate".to_string()]);
    }

    #[test]
    fn test_project_style_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let style = ProjectStyle {
            style: StyleDefinition {
                base_prompt: "minimal".to_string(),
                reference_images: vec!["ref.png".to_string()],
                ..StyleDefinition::default()
            },
            style_id: Some("corporate".to_string()),
        };

        save_project_style(dir.path(), &style).unwrap();
        let loaded = load_project_style(dir.path()).unwrap().unwrap();

        assert_eq!(loaded, style);
    }

    #[test]
    fn test_missing_project_style_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_project_style(dir.path()).unwrap(), None);
    }
}
