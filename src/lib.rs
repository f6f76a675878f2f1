// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod assistant;
pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod llm;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod state;
pub mod utils;

pub use assistant::{Comparator, DocumentAssistant};
pub use config::{Config, DatabaseConfig, DocumentConfig, EmbeddingConfig, LlmConfig};
pub use database::{
    BatchInserter, ChunkIndex, Embedder, InsertStats, LanceDbClient, MemoryIndex, SchemaManager,
};
pub use error::{AssistantError, Result};
pub use exporter::{ExportManifest, JsonExporter, PdfReportWriter};
pub use llm::{ChatModel, ChatRequest, GroqClient};
pub use models::{
    Answer, Chunk, ComparisonMatrix, ComparisonReport, DocumentRecord, ScoredChunk,
    StructuredProfile,
};
pub use parser::{DocumentChunker, DocumentLoader, MarkdownRenderer};
pub use pipeline::{IngestOutcome, IngestPipeline, IngestStats, ProgressTracker};
pub use state::{DocumentRegistry, SessionStore};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _embedder = Embedder::from_config(&config.embedding);
        let index = MemoryIndex::new();
        assert_eq!(tokio_test::block_on(index.count(None)).unwrap(), 0);
        assert!(DocumentRegistry::in_memory().is_empty());
    }
}
