// file: src/models/document.rs
// description: processed document record and text statistics
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_words: usize,
    pub total_characters: usize,
    pub total_chunks: usize,
    pub total_pages: usize,
}

impl DocumentStats {
    /// Statistics over the chunk texts joined by single spaces.
    pub fn from_chunks<'a>(chunks: impl IntoIterator<Item = &'a str>, total_pages: usize) -> Self {
        let texts: Vec<&str> = chunks.into_iter().collect();
        let joined = texts.join(" ");

        Self {
            total_words: joined.split_whitespace().count(),
            total_characters: joined.chars().count(),
            total_chunks: texts.len(),
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_id: String,
    pub filename: String,
    pub source_path: String,
    pub content_hash: String,
    pub stats: DocumentStats,
    /// Leading slice of the document text, used for structured extraction.
    pub text_excerpt: String,
    pub ingested_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(
        filename: String,
        source_path: String,
        full_text: &str,
        stats: DocumentStats,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            doc_id: Self::derive_id(&filename),
            filename,
            source_path,
            content_hash: Self::compute_hash(full_text),
            stats,
            text_excerpt: full_text.chars().take(excerpt_chars).collect(),
            ingested_at: Utc::now(),
        }
    }

    /// Stable identifier from a file name: the stem with spaces replaced.
    /// Characters outside `[A-Za-z0-9_.-]` become `_` so ids are safe in filters.
    pub fn derive_id(filename: &str) -> String {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());

        let id: String = stem
            .trim()
            .replace('\'', "")
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if id.is_empty() { "document".to_string() } else { id }
    }

    pub fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_id() {
        assert_eq!(DocumentRecord::derive_id("My Resume.pdf"), "My_Resume");
        assert_eq!(DocumentRecord::derive_id("report.txt"), "report");
        assert_eq!(DocumentRecord::derive_id("O'Brien CV.pdf"), "OBrien_CV");
        assert_eq!(DocumentRecord::derive_id("CV (1).pdf"), "CV__1_");
    }

    #[test]
    fn test_stats_from_chunks() {
        let stats = DocumentStats::from_chunks(["hello world", "rust is fast"], 2);
        assert_eq!(stats.total_words, 5);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.total_characters, "hello world rust is fast".len());
        assert_eq!(stats.total_pages, 2);
    }

    #[test]
    fn test_record_excerpt_and_hash() {
        let text = "a".repeat(50);
        let record = DocumentRecord::new(
            "doc.pdf".to_string(),
            "/tmp/doc.pdf".to_string(),
            &text,
            DocumentStats::default(),
            10,
        );

        assert_eq!(record.doc_id, "doc");
        assert_eq!(record.text_excerpt.len(), 10);
        assert_eq!(record.content_hash, DocumentRecord::compute_hash(&text));
    }
}
