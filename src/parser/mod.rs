// file: src/parser/mod.rs
// description: document loading, text cleanup and chunking exports
// reference: internal module structure

pub mod chunker;
pub mod loader;
pub mod markdown;
pub mod normalizer;

pub use chunker::DocumentChunker;
pub use loader::{DocumentLoader, LoadedDocument};
pub use markdown::{LineKind, MarkdownRenderer, RenderedLine};
pub use normalizer::TextNormalizer;
