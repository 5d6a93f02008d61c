// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generated artifact storage.
//!
//! Writes engine image bytes into the project's output directory with
//! timestamped names and probes decoded dimensions for provenance
//! metadata.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::engine::SlideResult;
use crate::error::Result;

/// File extension for a mime type, defaulting to `png`.
fn extension_for_mime_type(mime_type: &str) -> &'static str {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// Persist a slide result's image bytes and return the local path.
///
/// Files land in `output_dir` (created as needed) as
/// `<prefix>-<utc-timestamp>.<ext>`; the sub-second component keeps
/// names unique within one invocation.
pub fn persist(result: &SlideResult, output_dir: &Path, prefix: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let extension = extension_for_mime_type(&result.mime_type);
    let timestamp = Utc::now().format("%Y%m%dT%H%M%S%6fZ");
    let path = output_dir.join(format!("{prefix}-{timestamp}.{extension}"));
    fs::write(&path, &result.image_bytes)?;
    log::info!("Saved slide image to {}", path.display());
    Ok(path)
}

/// Decode the image header and return `(width, height)` when the bytes
/// are a readable image. Probing failures are not fatal; the artifact
/// is stored either way.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    match image::load_from_memory(bytes) {
        Ok(decoded) => Some((decoded.width(), decoded.height())),
        Err(e) => {
            log::debug!("Could not decode generated image: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::SlideMetadata;

    fn result_with_bytes(bytes: Vec<u8>, mime_type: &str) -> SlideResult {
        SlideResult {
            image_bytes: bytes,
            mime_type: mime_type.to_string(),
            revised_prompt: "prompt".to_string(),
            metadata: SlideMetadata::new(),
        }
    }

    #[test]
    fn test_persist_writes_bytes_with_mime_extension() {
        let dir = tempfile::tempdir().unwrap();
        let result = result_with_bytes(b"jpeg-bytes".to_vec(), "image/jpeg");

        let path = persist(&result, dir.path(), "slide").unwrap();

        assert_eq!(path.extension().unwrap(), "jpg");
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("slide-"));
        assert_eq!(fs::read(&path).unwrap(), b"jpeg-bytes");
    }

    #[test]
    fn test_persist_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/slides");
        let result = result_with_bytes(b"data".to_vec(), "image/png");

        let path = persist(&result, &nested, "slide").unwrap();

        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn test_probe_dimensions_on_real_png() {
        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(4, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        assert_eq!(probe_dimensions(&png), Some((4, 2)));
        assert_eq!(probe_dimensions(b"not an image"), None);
    }
}
