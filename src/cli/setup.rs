// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! `setup` command: store engine credentials and defaults.

use crate::error::{Error, Result};
use crate::io::config;

pub fn run(
    engine: &str,
    api_key: Option<String>,
    default_output_dir: Option<String>,
) -> Result<()> {
    if api_key.is_none() && default_output_dir.is_none() {
        return Err(Error::Validation(
            "nothing to store; pass --api-key and/or --default-output-dir".to_string(),
        ));
    }

    let mut config = config::load_config()?;
    if let Some(api_key) = api_key {
        config.api_keys.insert(engine.to_string(), api_key);
        config.default_engine = engine.to_string();
        println!("Stored API key for engine '{engine}'.");
    }
    if let Some(default_output_dir) = default_output_dir {
        config.default_output_dir = default_output_dir;
    }
    config::save_config(&config)?;
    Ok(())
}
