// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generation engine boundary.
//!
//! The engine is an external collaborator consumed through a narrow
//! request/response contract: composed prompt + reference images +
//! aspect ratio in, image bytes + revised prompt + provenance metadata
//! out. This module defines that contract; `gemini` implements it over
//! HTTP and `artifacts` persists the returned bytes.

pub mod artifacts;
pub mod gemini;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::project::SlideMetadata;
use crate::models::style::ResolvedStyle;
use crate::util::prompt;

/// Engine failure modes surfaced to the caller. The core never retries;
/// failures carry the provider status and message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The provider rejected authentication (401/403).
    #[error("authentication rejected by the provider: {0}")]
    Auth(String),

    /// Usage limits were hit (429 / quota exhausted).
    #[error("rate limit or quota exhausted: {0}")]
    RateLimited(String),

    /// The request itself was rejected (malformed, or blocked as unsafe).
    #[error("request rejected by the provider: {0}")]
    Rejected(String),

    /// A transient transport fault: timeout, connection error, 5xx.
    #[error("transient network failure: {0}")]
    Transport(String),

    /// The provider answered with something the client cannot use.
    #[error("unexpected provider response: {0}")]
    Protocol(String),
}

impl EngineError {
    /// Map an HTTP status code onto the failure taxonomy.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::RateLimited(message),
            400..=499 => Self::Rejected(message),
            500..=599 => Self::Transport(message),
            _ => Self::Protocol(format!("status {status}: {message}")),
        }
    }
}

/// Model selectors supported by the generation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelSelector {
    Flash,
    #[default]
    Pro,
}

impl ModelSelector {
    /// Concrete API model name behind the selector.
    pub fn api_model(self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flash => "flash",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSelector {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "flash" => Ok(Self::Flash),
            "pro" => Ok(Self::Pro),
            other => Err(format!("unknown model selector '{other}' (expected flash or pro)")),
        }
    }
}

/// Aspect ratios accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    R1x1,
    R2x3,
    R3x2,
    R3x4,
    R4x3,
    R4x5,
    R5x4,
    R9x16,
    #[default]
    R16x9,
    R21x9,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::R1x1 => "1:1",
            Self::R2x3 => "2:3",
            Self::R3x2 => "3:2",
            Self::R3x4 => "3:4",
            Self::R4x3 => "4:3",
            Self::R4x5 => "4:5",
            Self::R5x4 => "5:4",
            Self::R9x16 => "9:16",
            Self::R16x9 => "16:9",
            Self::R21x9 => "21:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "1:1" => Ok(Self::R1x1),
            "2:3" => Ok(Self::R2x3),
            "3:2" => Ok(Self::R3x2),
            "3:4" => Ok(Self::R3x4),
            "4:3" => Ok(Self::R4x3),
            "4:5" => Ok(Self::R4x5),
            "5:4" => Ok(Self::R5x4),
            "9:16" => Ok(Self::R9x16),
            "16:9" => Ok(Self::R16x9),
            "21:9" => Ok(Self::R21x9),
            other => Err(format!("unsupported aspect ratio '{other}'")),
        }
    }
}

/// A loaded reference image ready to attach to a request.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// One generation or edit request against the engine.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully composed prompt text (style sections included).
    pub prompt: String,
    /// Style reference images as visual conditioning.
    pub references: Vec<ReferenceImage>,
    pub aspect_ratio: AspectRatio,
}

/// Result payload returned by generation/edit operations.
#[derive(Debug, Clone)]
pub struct SlideResult {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    /// The prompt as actually submitted, stored back on the slide.
    pub revised_prompt: String,
    /// Provenance recorded into the slide entry.
    pub metadata: SlideMetadata,
}

/// Interface for AI image generation backends.
pub trait SlideEngine {
    /// Generate a slide from scratch.
    fn generate(&self, request: &GenerationRequest) -> std::result::Result<SlideResult, EngineError>;

    /// Edit an existing slide image.
    fn edit(
        &self,
        source_image: &[u8],
        request: &GenerationRequest,
    ) -> std::result::Result<SlideResult, EngineError>;
}

/// Build a generation request from an instruction and resolved style.
///
/// Reference text files are inlined into the instruction, the style
/// sections are composed around it, and the style's reference images
/// are loaded from disk. Fails before any network traffic when a
/// reference is missing.
pub fn build_request(
    instruction: &str,
    style: &ResolvedStyle,
    reference_files: &[PathBuf],
    aspect_ratio: AspectRatio,
    is_edit: bool,
) -> Result<GenerationRequest> {
    let instruction = prompt::inject_reference_files(instruction, reference_files)?;
    let composed = prompt::compose(&instruction, style, is_edit);
    let references = load_reference_images(&style.reference_images)?;
    Ok(GenerationRequest {
        prompt: composed,
        references,
        aspect_ratio,
    })
}

/// Read style reference images into memory, inferring the mime type
/// from the file extension.
fn load_reference_images(paths: &[String]) -> Result<Vec<ReferenceImage>> {
    let mut references = Vec::with_capacity(paths.len());
    for raw_path in paths {
        let path = std::path::Path::new(raw_path);
        if !path.is_file() {
            return Err(Error::not_found("reference image", raw_path.clone()));
        }
        let bytes = std::fs::read(path)?;
        references.push(ReferenceImage {
            bytes,
            mime_type: mime_type_for_path(path).to_string(),
        });
    }
    Ok(references)
}

/// Mime type for an image path, defaulting to PNG.
pub(crate) fn mime_type_for_path(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
