// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{AssistantError, Result};
use std::fs;
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_file_path(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(AssistantError::Validation(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let canonical = fs::canonicalize(path).map_err(|e| {
            AssistantError::Validation(format!(
                "Cannot canonicalize path {}: {}",
                path.display(),
                e
            ))
        })?;

        if !canonical.is_file() {
            return Err(AssistantError::Validation(format!(
                "Path is not a file: {}",
                canonical.display()
            )));
        }

        Ok(())
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(AssistantError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(AssistantError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Lower-cased extension of `path` when it is one of `allowed`.
    pub fn validate_extension(path: &Path, allowed: &[String]) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if allowed.iter().any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&extension)) {
            return Ok(extension);
        }

        Err(AssistantError::Validation(format!(
            "Unsupported file type '{}' for {} (allowed: {})",
            extension,
            path.display(),
            allowed.join(", ")
        )))
    }

    pub fn validate_file_size(path: &Path, max_bytes: u64) -> Result<u64> {
        let size = fs::metadata(path)
            .map_err(|source| AssistantError::FileOperation {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if max_bytes > 0 && size > max_bytes {
            return Err(AssistantError::Validation(format!(
                "File too large ({} bytes, max {} bytes): {}",
                size,
                max_bytes,
                path.display()
            )));
        }

        Ok(size)
    }

    pub fn validate_document_count(count: usize, min: usize, max: usize) -> Result<()> {
        if count < min || count > max {
            return Err(AssistantError::Validation(format!(
                "Comparison needs between {} and {} documents, got {}",
                min, max, count
            )));
        }
        Ok(())
    }

    /// Document ids end up inside LanceDB filter predicates.
    pub fn validate_doc_id(doc_id: &str) -> Result<()> {
        if doc_id.is_empty()
            || !doc_id
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(AssistantError::Validation(format!(
                "Invalid document id: '{}'",
                doc_id
            )));
        }
        Ok(())
    }

    /// First `max_chars` characters, never splitting a code point.
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            format!("{}...", Self::truncate_chars(text, max_length))
        }
    }

    /// Shortens to `max_length` characters total, ellipsis included.
    pub fn shorten(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let keep = max_length.saturating_sub(3);
            format!("{}...", Self::truncate_chars(text, keep))
        }
    }
}
