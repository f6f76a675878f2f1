// file: src/database/client.rs
// description: LanceDB client wrapper with connection management and chunk queries
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::error::{AssistantError, Result};
use crate::models::{Chunk, ScoredChunk};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray, UInt32Array};
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table, connect};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct LanceDbClient {
    connection: Connection,
    config: DatabaseConfig,
    dimension: usize,
}

pub(crate) fn doc_predicate(doc_id: &str) -> String {
    format!("doc_id = '{}'", doc_id.replace('\'', "''"))
}

fn string_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AssistantError::Database(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AssistantError::Database(format!("Invalid '{}' column type", name)))
}

fn u32_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b UInt32Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AssistantError::Database(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| AssistantError::Database(format!("Invalid '{}' column type", name)))
}

impl LanceDbClient {
    pub async fn new(config: DatabaseConfig, dimension: usize) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri).execute().await.map_err(|e| {
            AssistantError::Database(format!("Failed to connect to LanceDB: {}", e))
        })?;

        Ok(Self {
            connection,
            config,
            dimension,
        })
    }

    pub fn get_connection(&self) -> &Connection {
        &self.connection
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking LanceDB connection");

        match self.connection.table_names().execute().await {
            Ok(_) => Ok(true),
            Err(e) => Err(AssistantError::Database(format!(
                "LanceDB connection failed: {}",
                e
            ))),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == table_name))
    }

    pub async fn get_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| {
                AssistantError::Database(format!("Failed to open table {}: {}", table_name, e))
            })
    }

    pub async fn count_chunks(&self, doc_filter: Option<&str>) -> Result<usize> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(0);
        }

        let table = self.get_table(&self.config.table_name).await?;
        table
            .count_rows(doc_filter.map(doc_predicate))
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to count rows: {}", e)))
    }

    /// Delete every chunk belonging to one document.
    pub async fn delete_by_document(&self, doc_id: &str) -> Result<()> {
        if !self.table_exists(&self.config.table_name).await? {
            debug!("Table does not exist, nothing to delete");
            return Ok(());
        }

        let table = self.get_table(&self.config.table_name).await?;
        let predicate = doc_predicate(doc_id);

        info!("Deleting chunks with predicate: {}", predicate);

        table.delete(&predicate).await.map_err(|e| {
            AssistantError::Database(format!(
                "Failed to delete chunks for document {}: {}",
                doc_id, e
            ))
        })?;

        Ok(())
    }

    /// Nearest chunks to `query_embedding`, best first.
    ///
    /// Scores are `1 / (1 + distance)` so higher means more similar.
    pub async fn vector_search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        doc_filter: Option<&str>,
    ) -> Result<Vec<ScoredChunk>> {
        if !self.table_exists(&self.config.table_name).await? {
            warn!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        if query_embedding.len() != self.dimension {
            return Err(AssistantError::Database(format!(
                "Query embedding has dimension {}, index expects {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let table = self.get_table(&self.config.table_name).await?;

        debug!("Performing vector search with limit {}", limit);

        let mut query = table
            .vector_search(query_embedding.to_vec())
            .map_err(|e| {
                AssistantError::Database(format!("Failed to create vector search: {}", e))
            })?
            .limit(limit);

        if let Some(doc_id) = doc_filter {
            let filter = doc_predicate(doc_id);
            debug!("Applied filter: {}", filter);
            query = query.only_if(filter);
        }

        let mut results_stream = query
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Vector search failed: {}", e)))?;

        let mut search_results = Vec::new();

        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result.map_err(|e| {
                AssistantError::Database(format!("Failed to read result batch: {}", e))
            })?;

            let doc_ids = string_column(&batch, "doc_id")?;
            let contents = string_column(&batch, "content")?;
            let chunk_indices = u32_column(&batch, "chunk_index")?;
            let pages = u32_column(&batch, "page")?;

            let distances = batch
                .column_by_name("_distance")
                .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

            for i in 0..batch.num_rows() {
                let chunk = Chunk::new(
                    doc_ids.value(i),
                    chunk_indices.value(i),
                    pages.value(i),
                    contents.value(i).to_string(),
                );

                let (score, distance) = match distances {
                    Some(dist_array) if !dist_array.is_null(i) => {
                        let dist = dist_array.value(i);
                        (1.0 / (1.0 + dist), Some(dist))
                    }
                    _ => (1.0, None),
                };

                search_results.push(ScoredChunk::new(chunk, score, distance));
            }
        }

        search_results.sort_by(|a, b| b.score.total_cmp(&a.score));
        debug!("Vector search returned {} results", search_results.len());
        Ok(search_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_predicate_escapes_quotes() {
        assert_eq!(doc_predicate("resume"), "doc_id = 'resume'");
        assert_eq!(doc_predicate("o'brien"), "doc_id = 'o''brien'");
    }

    #[tokio::test]
    async fn test_empty_database_queries() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig {
            uri: temp.path().join("db").display().to_string(),
            table_name: "chunks".to_string(),
            batch_size: 10,
        };

        let client = LanceDbClient::new(config, 8).await.unwrap();
        assert!(client.ping().await.unwrap());
        assert_eq!(client.count_chunks(None).await.unwrap(), 0);
        assert!(client.vector_search(&[0.0; 8], 3, None).await.unwrap().is_empty());
        client.delete_by_document("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_chunk_round_trip() {
        use crate::database::ChunkIndex;

        let temp = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig {
            uri: temp.path().join("db").display().to_string(),
            table_name: "chunks".to_string(),
            batch_size: 2,
        };
        let client = LanceDbClient::new(config, 4).await.unwrap();

        let chunks = vec![
            Chunk::new("cv", 0, 1, "rust".to_string()),
            Chunk::new("cv", 1, 1, "go".to_string()),
            Chunk::new("cv", 2, 2, "python".to_string()),
            Chunk::new("letter", 0, 1, "dear team".to_string()),
        ];
        let embeddings = vec![
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.7, 0.7, 0.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0],
        ];
        assert_eq!(client.add_chunks(&chunks, &embeddings).await.unwrap(), 4);
        assert_eq!(client.count(None).await.unwrap(), 4);
        assert_eq!(client.count(Some("cv")).await.unwrap(), 3);

        let results = client
            .search(&[1.0, 0.0, 0.0, 0.0], 10, Some("cv"))
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.chunk.doc_id == "cv"));
        assert_eq!(results[0].content(), "rust");
        assert_eq!(results[2].content(), "go");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        for result in &results {
            let distance = result.distance.unwrap();
            assert!((result.score - 1.0 / (1.0 + distance)).abs() < 1e-6);
        }
        assert!((results[0].score - 1.0).abs() < 1e-6);

        assert!(client.search(&[1.0; 4], 0, None).await.unwrap().is_empty());
        assert!(client.search(&[1.0; 3], 2, None).await.is_err());

        client.remove_document("cv").await.unwrap();
        assert_eq!(client.count(Some("cv")).await.unwrap(), 0);
        assert_eq!(client.count(None).await.unwrap(), 1);
        let remaining = client.search(&[1.0, 0.0, 0.0, 0.0], 5, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].chunk.doc_id, "letter");
    }
}
