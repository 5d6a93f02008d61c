// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! SLIDEGEN - AI-powered presentation slide generator
//!
//! A command-line tool for generating slide images with an external
//! multimodal engine and managing the project state that tracks them:
//! deck ordering, draft review, and style presets.

mod cli;
mod engine;
mod error;
mod io;
mod models;
mod util;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; --verbose raises the default filter.
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .format_timestamp(None)
    .init();

    cli::run(args)?;
    Ok(())
}
