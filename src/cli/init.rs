// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `init` command: create a fresh project state file.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::io::{config, state};
use crate::models::project::ProjectDocument;

pub fn run(dir: &Path, name: Option<&str>, force: bool) -> Result<()> {
    let project_dir = match name {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    };
    let project_name = match name {
        Some(name) => name.to_string(),
        None => current_dir_name(dir),
    };

    let state_path = state::state_path(&project_dir);
    if state_path.exists() && !force {
        return Err(Error::Validation(format!(
            "{} already exists; use --force to overwrite",
            state_path.display()
        )));
    }

    fs::create_dir_all(&project_dir)?;
    let config = config::load_config()?;
    let document = ProjectDocument::new(project_name.clone(), config.default_engine);
    state::save(&project_dir, &document)?;

    log::info!("Initialized project '{project_name}'");
    println!(
        "Initialized slides project '{project_name}' at {}",
        state_path.display()
    );
    Ok(())
}

fn current_dir_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "slides".to_string())
}
