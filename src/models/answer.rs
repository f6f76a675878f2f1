// file: src/models/answer.rs
// description: answer returned by single-document question answering
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
    pub session_id: String,
    pub conversation_length: usize,
    /// Answered from document statistics without calling the model.
    pub from_statistics: bool,
}

impl Answer {
    pub fn no_document(session_id: &str) -> Self {
        Self {
            answer: "Please upload and process a document first.".to_string(),
            sources: Vec::new(),
            session_id: session_id.to_string(),
            conversation_length: 0,
            from_statistics: false,
        }
    }
}
