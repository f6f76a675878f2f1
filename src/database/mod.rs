// file: src/database/mod.rs
// description: vector storage module exports
// reference: internal module structure

pub mod client;
pub mod embeddings;
pub mod index;
pub mod insert;
pub mod memory;
pub mod schema;

pub use client::LanceDbClient;
pub use embeddings::{Embedder, cosine_similarity};
pub use index::ChunkIndex;
pub use insert::{BatchInserter, InsertStats};
pub use memory::MemoryIndex;
pub use schema::SchemaManager;
