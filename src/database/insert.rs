// file: src/database/insert.rs
// description: LanceDB batch insertion of embedded chunks
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::database::schema::SchemaManager;
use crate::error::{AssistantError, Result};
use crate::models::Chunk;
use arrow_array::{
    FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray, UInt32Array,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct BatchInserter<'a> {
    client: &'a LanceDbClient,
}

#[derive(Debug, Clone, Default)]
pub struct InsertStats {
    pub chunks_inserted: usize,
    pub batches: usize,
}

impl<'a> BatchInserter<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    /// Inserts chunks in `batch_size` slices, creating the table on first use.
    pub async fn insert_chunks(
        &self,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<InsertStats> {
        if chunks.len() != embeddings.len() {
            return Err(AssistantError::Database(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut stats = InsertStats::default();
        if chunks.is_empty() {
            return Ok(stats);
        }

        let dimension = self.client.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(AssistantError::Database(format!(
                "Embedding has dimension {}, index expects {}",
                bad.len(),
                dimension
            )));
        }

        let schema = SchemaManager::chunk_schema(dimension);
        let table_name = self.client.table_name();
        let batch_size = self.client.batch_size().max(1);

        for (chunk_batch, embedding_batch) in chunks
            .chunks(batch_size)
            .zip(embeddings.chunks(batch_size))
        {
            let record_batch =
                Self::create_record_batch(schema.clone(), chunk_batch, embedding_batch)?;
            let reader = RecordBatchIterator::new(vec![Ok(record_batch)], schema.clone());

            if !self.client.table_exists(table_name).await? {
                self.client
                    .get_connection()
                    .create_table(table_name, reader)
                    .execute()
                    .await
                    .map_err(|e| {
                        AssistantError::Database(format!("Failed to create table: {}", e))
                    })?;
                info!("Created new table: {}", table_name);
            } else {
                let table = self.client.get_table(table_name).await?;
                table.add(reader).execute().await.map_err(|e| {
                    AssistantError::Database(format!("Failed to insert chunks: {}", e))
                })?;
            }

            stats.chunks_inserted += chunk_batch.len();
            stats.batches += 1;
            debug!(
                "Inserted batch {} ({} chunks)",
                stats.batches,
                chunk_batch.len()
            );
        }

        Ok(stats)
    }

    fn create_record_batch(
        schema: Arc<arrow_schema::Schema>,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch> {
        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);

        let ids: StringArray = chunks.iter().map(|c| Some(c.id())).collect();
        let doc_ids: StringArray = chunks.iter().map(|c| Some(c.doc_id.as_str())).collect();
        let chunk_indices: UInt32Array = chunks.iter().map(|c| Some(c.chunk_index)).collect();
        let pages: UInt32Array = chunks.iter().map(|c| Some(c.page)).collect();
        let contents: StringArray = chunks.iter().map(|c| Some(c.content.as_str())).collect();

        let embedding_values: Float32Array = embeddings
            .iter()
            .flat_map(|emb| emb.iter().copied())
            .collect();

        let embedding_list =
            FixedSizeListArray::try_new_from_values(embedding_values, dimension as i32).map_err(
                |e| AssistantError::Database(format!("Failed to create embedding array: {}", e)),
            )?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(doc_ids),
                Arc::new(chunk_indices),
                Arc::new(pages),
                Arc::new(contents),
                Arc::new(embedding_list),
            ],
        )
        .map_err(|e| AssistantError::Database(format!("Failed to create record batch: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_stats_default() {
        let stats = InsertStats::default();
        assert_eq!(stats.chunks_inserted, 0);
        assert_eq!(stats.batches, 0);
    }

    #[test]
    fn test_record_batch_layout() {
        let chunks = vec![
            Chunk::new("cv", 0, 1, "first".to_string()),
            Chunk::new("cv", 1, 2, "second".to_string()),
        ];
        let embeddings = vec![vec![0.5; 4], vec![0.25; 4]];

        let batch = BatchInserter::create_record_batch(
            SchemaManager::chunk_schema(4),
            &chunks,
            &embeddings,
        )
        .unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);
    }
}
