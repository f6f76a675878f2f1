// file: src/parser/chunker.rs
// description: recursive character splitting of page text into overlapping chunks
// reference: https://docs.rs/text-splitter

use crate::error::{AssistantError, Result};
use crate::models::Chunk;
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DocumentChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(AssistantError::Config(format!(
                "invalid chunking parameters: size {} overlap {}",
                chunk_size, chunk_overlap
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    fn splitter(&self) -> Result<TextSplitter<text_splitter::Characters>> {
        let config = ChunkConfig::new(self.chunk_size)
            .with_overlap(self.chunk_overlap)
            .map_err(|e| AssistantError::Config(e.to_string()))?
            .with_trim(true);
        Ok(TextSplitter::new(config))
    }

    /// Splits every page on its own so each chunk keeps its page number.
    /// Blank chunks are dropped; chunk indices stay contiguous.
    pub fn split_pages(&self, doc_id: &str, pages: &[String]) -> Result<Vec<Chunk>> {
        let splitter = self.splitter()?;
        let mut chunks = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            for piece in splitter.chunks(page) {
                if piece.trim().is_empty() {
                    continue;
                }
                chunks.push(Chunk::new(
                    doc_id,
                    chunks.len() as u32,
                    page_idx as u32 + 1,
                    piece.to_string(),
                ));
            }
        }

        debug!(
            "Split {} pages of '{}' into {} chunks",
            pages.len(),
            doc_id,
            chunks.len()
        );

        if chunks.is_empty() {
            return Err(AssistantError::Validation(
                "Document splitting produced no valid chunks".to_string(),
            ));
        }

        Ok(chunks)
    }

    pub fn process_text(&self, doc_id: &str, text: &str) -> Result<Vec<Chunk>> {
        if text.trim().is_empty() {
            return Err(AssistantError::Validation(
                "Cannot process empty text".to_string(),
            ));
        }
        self.split_pages(doc_id, &[text.to_string()])
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(DocumentChunker::new(0, 0).is_err());
        assert!(DocumentChunker::new(100, 100).is_err());
        assert!(DocumentChunker::new(500, 100).is_ok());
    }

    #[test]
    fn test_chunks_respect_size_and_pages() {
        let chunker = DocumentChunker::new(100, 20).unwrap();
        let pages = vec![
            "Rust is a systems programming language. ".repeat(10),
            String::new(),
            "Page three talks about ownership and borrowing.".to_string(),
        ];

        let chunks = chunker.split_pages("doc", &pages).unwrap();
        assert!(chunks.len() > 2);
        assert!(chunks.iter().all(|c| c.content.chars().count() <= 100));
        assert!(chunks.iter().all(|c| !c.content.trim().is_empty()));
        assert_eq!(chunks.first().unwrap().page, 1);
        assert_eq!(chunks.last().unwrap().page, 3);

        for (idx, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index as usize, idx);
        }
    }

    #[test]
    fn test_blank_document_fails() {
        let chunker = DocumentChunker::new(100, 10).unwrap();
        assert!(chunker.split_pages("doc", &["   \n\n ".to_string()]).is_err());
        assert!(chunker.process_text("doc", "").is_err());
    }

    #[test]
    fn test_process_text_single_page() {
        let chunker = DocumentChunker::new(500, 100).unwrap();
        let chunks = chunker.process_text("notes", "short note").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short note");
        assert_eq!(chunks[0].doc_id, "notes");
    }
}
