// file: src/models/search_result.rs
// description: retrieved chunk paired with its similarity
// reference: vector search over the chunk index

use crate::models::Chunk;
use crate::utils::Validator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Higher is closer. Cosine similarity for the in-memory index.
    pub score: f32,
    /// Raw distance when the backend reports one.
    pub distance: Option<f32>,
}

impl ScoredChunk {
    pub fn new(chunk: Chunk, score: f32, distance: Option<f32>) -> Self {
        Self {
            chunk,
            score,
            distance,
        }
    }

    pub fn content(&self) -> &str {
        &self.chunk.content
    }

    /// Source preview shown under an answer.
    pub fn preview(&self, max_chars: usize) -> String {
        format!("{}...", Validator::truncate_chars(&self.chunk.content, max_chars))
    }

    /// One entry of `docsage search` output.
    pub fn format_summary(&self, max_content_len: usize) -> String {
        format!(
            "Score: {:.4} | {} (page {}, chunk {})\n{}\n",
            self.score,
            self.chunk.doc_id,
            self.chunk.page,
            self.chunk.chunk_index,
            Validator::truncate_text(&self.chunk.content, max_content_len)
        )
    }
}
