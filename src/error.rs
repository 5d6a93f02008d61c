// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error taxonomy shared across the crate.
//!
//! Every fallible operation in the core returns [`Error`]. Mutations are
//! all-or-nothing: on any error the in-memory document is discarded and
//! the on-disk state file stays untouched.

use std::path::PathBuf;

use crate::engine::EngineError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure categories surfaced to the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity (state file, slide, style preset, ...) does not exist.
    #[error("{kind} '{name}' was not found")]
    NotFound { kind: &'static str, name: String },

    /// The project state document violates one of its invariants.
    #[error("invalid project state: {0}")]
    Validation(String),

    /// A 1-based position argument falls outside the deck.
    #[error("position {position} is out of range (expected 1..={max})")]
    Range { position: usize, max: usize },

    /// The generation engine failed; the underlying cause is preserved
    /// and never retried by the core.
    #[error("engine request failed: {0}")]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed YAML in {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with an owned name.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}
