// file: src/models/chunk.rs
// description: text chunk produced by the splitter and stored in the index
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: String,
    pub chunk_index: u32,
    /// 1-based page number the chunk was cut from.
    pub page: u32,
    pub content: String,
}

impl Chunk {
    pub fn new(doc_id: impl Into<String>, chunk_index: u32, page: u32, content: String) -> Self {
        Self {
            doc_id: doc_id.into(),
            chunk_index,
            page,
            content,
        }
    }

    pub fn id(&self) -> String {
        format!("{}:{}", self.doc_id, self.chunk_index)
    }
}
