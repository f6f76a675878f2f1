// file: src/database/index.rs
// description: vector index abstraction over chunk storage backends
// reference: internal module structure

use crate::database::client::LanceDbClient;
use crate::database::insert::BatchInserter;
use crate::database::schema::SchemaManager;
use crate::error::Result;
use crate::models::{Chunk, ScoredChunk};

/// Storage for embedded chunks with filtered similarity search.
#[allow(async_fn_in_trait)]
pub trait ChunkIndex {
    /// Stores chunks with their embeddings and returns how many were written.
    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize>;

    /// Best matches first, restricted to one document when `doc_filter` is set.
    async fn search(
        &self,
        query: &[f32],
        k: usize,
        doc_filter: Option<&str>,
    ) -> Result<Vec<ScoredChunk>>;

    async fn remove_document(&self, doc_id: &str) -> Result<()>;

    async fn count(&self, doc_filter: Option<&str>) -> Result<usize>;

    async fn clear(&self) -> Result<()>;
}

impl ChunkIndex for LanceDbClient {
    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        let stats = BatchInserter::new(self)
            .insert_chunks(chunks, embeddings)
            .await?;
        Ok(stats.chunks_inserted)
    }

    async fn search(
        &self,
        query: &[f32],
        k: usize,
        doc_filter: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        self.vector_search(query, k, doc_filter).await
    }

    async fn remove_document(&self, doc_id: &str) -> Result<()> {
        self.delete_by_document(doc_id).await
    }

    async fn count(&self, doc_filter: Option<&str>) -> Result<usize> {
        self.count_chunks(doc_filter).await
    }

    async fn clear(&self) -> Result<()> {
        SchemaManager::new(self).drop_all_tables().await
    }
}
