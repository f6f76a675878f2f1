// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error processing PDF {file}: {message}")]
    PdfExtraction { file: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM request failed{}: {message}", format_status(.status))]
    Llm {
        status: Option<u16>,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("No document has been processed yet")]
    NoDocument,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn format_status(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {}", code))
        .unwrap_or_default()
}

impl AssistantError {
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            status: None,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_display() {
        let err = AssistantError::Llm {
            status: Some(429),
            message: "rate limited".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "LLM request failed with status 429: rate limited"
        );

        let err = AssistantError::llm("timeout");
        assert_eq!(err.to_string(), "LLM request failed: timeout");
    }
}
