// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Prompt composition.
//!
//! Builds the final text sent to the generation engine from the user
//! instruction and the resolved style, and inlines reference text files
//! as factual context.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::style::ResolvedStyle;

/// Cap on inlined reference file content, in characters.
const MAX_REFERENCE_FILE_CHARS: usize = 12_000;

/// Compose the engine prompt from an instruction and a resolved style.
///
/// Sections, in order: style base prompt, the instruction, a note about
/// attached reference images, per-reference comments, the negative
/// prompt, the preset name, and for edits a scope guard telling the
/// engine to leave everything unspecified alone. Empty sections are
/// dropped; the rest are joined with blank lines.
pub fn compose(instruction: &str, style: &ResolvedStyle, is_edit: bool) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !style.base_prompt.trim().is_empty() {
        sections.push(style.base_prompt.trim().to_string());
    }
    sections.push(instruction.trim().to_string());
    if !style.reference_images.is_empty() {
        sections.push(format!(
            "{} style reference image(s) are attached. Use them only as visual \
             style guidance for palette, tone, and texture.",
            style.reference_images.len()
        ));
    }
    if !style.reference_comments.is_empty() {
        let comments: Vec<String> = style
            .reference_comments
            .iter()
            .map(|(path, comment)| format!("- {path}: {comment}"))
            .collect();
        sections.push(format!("Style references:\n{}", comments.join("\n")));
    }
    if !style.negative_prompt.trim().is_empty() {
        sections.push(format!("Avoid:\n{}", style.negative_prompt.trim()));
    }
    if let Some(style_id) = &style.style_id {
        sections.push(format!("Apply global style preset: {style_id}"));
    }
    if is_edit {
        sections.push(
            "Do not modify anything else except what is specified by the user.".to_string(),
        );
    }

    sections.retain(|section| !section.is_empty());
    sections.join("\n\n")
}

/// Append reference text file contents to an instruction.
///
/// Each file is wrapped in BEGIN/END markers and truncated at
/// [`MAX_REFERENCE_FILE_CHARS`]. Binary files are rejected.
pub fn inject_reference_files(instruction: &str, files: &[std::path::PathBuf]) -> Result<String> {
    if files.is_empty() {
        return Ok(instruction.to_string());
    }

    let mut sections = Vec::with_capacity(files.len());
    for path in files {
        let (content, truncated) = read_text_file(path)?;
        let truncated_note = if truncated { "\n[...truncated...]" } else { "" };
        sections.push(format!(
            "Reference file: {}\n----- BEGIN FILE -----\n{content}{truncated_note}\n----- END FILE -----",
            path.display()
        ));
    }

    Ok(format!(
        "{instruction}\n\nUse the following reference files as factual context for this \
         slide. If the prompt conflicts with the files, prefer file details.\n\n{}",
        sections.join("\n\n")
    ))
}

fn read_text_file(path: &Path) -> Result<(String, bool)> {
    let raw = fs::read(path)?;
    if raw.contains(&0) {
        return Err(Error::Validation(format!(
            "reference file appears to be binary and cannot be used: {}",
            path.display()
        )));
    }
    let decoded = String::from_utf8_lossy(&raw);
    if decoded.chars().count() <= MAX_REFERENCE_FILE_CHARS {
        return Ok((decoded.into_owned(), false));
    }
    Ok((decoded.chars().take(MAX_REFERENCE_FILE_CHARS).collect(), true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn style_with_everything() -> ResolvedStyle {
        ResolvedStyle {
            style_id: Some("corporate".to_string()),
            base_prompt: "flat vector illustration".to_string(),
            negative_prompt: "photorealism".to_string(),
            reference_images: vec!["brand.png".to_string()],
            reference_comments: [("brand.png".to_string(), "match the palette".to_string())]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_compose_orders_sections() {
        let prompt = compose("A title slide", &style_with_everything(), false);

        let base = prompt.find("flat vector illustration").unwrap();
        let instruction = prompt.find("A title slide").unwrap();
        let references = prompt.find("style reference image(s)").unwrap();
        let comments = prompt.find("match the palette").unwrap();
        let negative = prompt.find("Avoid:").unwrap();
        let preset = prompt.find("Apply global style preset: corporate").unwrap();
        assert!(base < instruction);
        assert!(instruction < references);
        assert!(references < comments);
        assert!(comments < negative);
        assert!(negative < preset);
        assert!(!prompt.contains("Do not modify"));
    }

    #[test]
    fn test_compose_edit_appends_scope_guard() {
        let prompt = compose("Make the title bold", &style_with_everything(), true);
        assert!(prompt.ends_with("Do not modify anything else except what is specified by the user."));
    }

    #[test]
    fn test_compose_plain_prompt_without_style() {
        let prompt = compose("Just this", &ResolvedStyle::default(), false);
        assert_eq!(prompt, "Just this");
    }

    #[test]
    fn test_inject_reference_files_wraps_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Q3 revenue grew 40%").unwrap();

        let text =
            inject_reference_files("Revenue slide", &[file.path().to_path_buf()]).unwrap();

        assert!(text.starts_with("Revenue slide"));
        assert!(text.contains("----- BEGIN FILE -----"));
        assert!(text.contains("Q3 revenue grew 40%"));
        assert!(text.contains("----- END FILE -----"));
    }

    #[test]
    fn test_inject_reference_files_rejects_binary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x89, 0x50, 0x4e, 0x47, 0x00, 0x01]).unwrap();

        let result = inject_reference_files("Slide", &[file.path().to_path_buf()]);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_inject_reference_files_truncates_long_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("x".repeat(MAX_REFERENCE_FILE_CHARS + 100).as_bytes())
            .unwrap();

        let text = inject_reference_files("Slide", &[file.path().to_path_buf()]).unwrap();

        assert!(text.contains("[...truncated...]"));
    }
}
