// file: src/database/schema.rs
// description: LanceDB schema management for the chunk table
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::error::{AssistantError, Result};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SchemaManager<'a> {
    client: &'a LanceDbClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    /// Fails when an existing chunk table was built for another embedding width
    /// or lacks a chunk column. A missing table is fine, it is created on first insert.
    pub async fn verify_schema(&self) -> Result<()> {
        let table_name = self.client.table_name();

        if !self.client.table_exists(table_name).await? {
            warn!("Table '{}' does not exist yet", table_name);
            return Ok(());
        }

        let table = self.client.get_table(table_name).await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to read schema: {}", e)))?;

        let expected = Self::chunk_schema(self.client.dimension());
        for field in expected.fields() {
            let found = schema.field_with_name(field.name()).map_err(|_| {
                AssistantError::Database(format!(
                    "Table '{}' has no '{}' column. Run `docsage reset --confirm` to rebuild it",
                    table_name,
                    field.name()
                ))
            })?;

            if found.data_type() == field.data_type() {
                continue;
            }

            return Err(match found.data_type() {
                DataType::FixedSizeList(_, width) if field.name() == "embedding" => {
                    AssistantError::Database(format!(
                        "Table '{}' stores {}-dimensional embeddings but embedding.dimension is {}. \
                         Restore the old dimension or run `docsage reset --confirm` and re-ingest",
                        table_name,
                        width,
                        self.client.dimension()
                    ))
                }
                other => AssistantError::Database(format!(
                    "Table '{}' column '{}' is {:?}, expected {:?}",
                    table_name,
                    field.name(),
                    other,
                    field.data_type()
                )),
            });
        }

        debug!("Table '{}' matches the chunk schema", table_name);
        Ok(())
    }

    /// Arrow schema of the chunk table. The embedding column width is fixed per table.
    pub fn chunk_schema(embedding_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("doc_id", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("page", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ]))
    }

    pub async fn drop_all_tables(&self) -> Result<()> {
        let table_name = self.client.table_name();

        if self.client.table_exists(table_name).await? {
            warn!("Dropping table {}", table_name);
            self.client
                .get_connection()
                .drop_table(table_name)
                .await
                .map_err(|e| {
                    AssistantError::Database(format!("Failed to drop table {}: {}", table_name, e))
                })?;
            info!("Dropped table: {}", table_name);
        }

        Ok(())
    }
}
