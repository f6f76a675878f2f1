// file: src/database/memory.rs
// description: in-process brute force chunk index
// reference: internal module structure

use crate::database::embeddings::cosine_similarity;
use crate::database::index::ChunkIndex;
use crate::error::{AssistantError, Result};
use crate::models::{Chunk, ScoredChunk};
use tokio::sync::RwLock;

/// Holds every vector in memory and scores by cosine similarity.
#[derive(Default)]
pub struct MemoryIndex {
    entries: RwLock<Vec<(Chunk, Vec<f32>)>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkIndex for MemoryIndex {
    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(AssistantError::Database(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut entries = self.entries.write().await;
        entries.extend(chunks.iter().cloned().zip(embeddings.iter().cloned()));
        Ok(chunks.len())
    }

    async fn search(
        &self,
        query: &[f32],
        k: usize,
        doc_filter: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        let entries = self.entries.read().await;

        let mut scored: Vec<ScoredChunk> = entries
            .iter()
            .filter(|(chunk, _)| doc_filter.is_none_or(|id| chunk.doc_id == id))
            .map(|(chunk, embedding)| {
                let similarity = cosine_similarity(query, embedding);
                ScoredChunk::new(chunk.clone(), similarity, Some(1.0 - similarity))
            })
            .collect();

        // stable sort keeps insertion order on ties
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn remove_document(&self, doc_id: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .retain(|(chunk, _)| chunk.doc_id != doc_id);
        Ok(())
    }

    async fn count(&self, doc_filter: Option<&str>) -> Result<usize> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(chunk, _)| doc_filter.is_none_or(|id| chunk.doc_id == id))
            .count())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(doc: &str, idx: u32, text: &str) -> Chunk {
        Chunk::new(doc, idx, 1, text.to_string())
    }

    #[tokio::test]
    async fn test_search_orders_and_filters() {
        let index = MemoryIndex::new();
        index
            .add_chunks(
                &[chunk("a", 0, "x"), chunk("a", 1, "y"), chunk("b", 0, "z")],
                &[vec![1.0, 0.0], vec![0.6, 0.8], vec![1.0, 0.0]],
            )
            .await
            .unwrap();

        let all = index.search(&[1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].chunk.id(), "a:0");
        assert_eq!(all[1].chunk.id(), "b:0");

        let only_a = index.search(&[1.0, 0.0], 5, Some("a")).await.unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|r| r.chunk.doc_id == "a"));
        assert!(only_a[0].score >= only_a[1].score);
    }

    #[tokio::test]
    async fn test_remove_and_count() {
        let index = MemoryIndex::new();
        index
            .add_chunks(&[chunk("a", 0, "x"), chunk("b", 0, "y")], &[vec![1.0], vec![1.0]])
            .await
            .unwrap();

        assert_eq!(index.count(None).await.unwrap(), 2);
        index.remove_document("a").await.unwrap();
        assert_eq!(index.count(Some("a")).await.unwrap(), 0);
        assert_eq!(index.count(None).await.unwrap(), 1);

        index.clear().await.unwrap();
        assert_eq!(index.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mismatched_lengths_rejected() {
        let index = MemoryIndex::new();
        assert!(index.add_chunks(&[chunk("a", 0, "x")], &[]).await.is_err());
    }
}
