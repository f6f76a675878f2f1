// file: src/state/registry.rs
// description: persistent registry of ingested documents
// reference: internal module structure

use crate::error::{AssistantError, Result};
use crate::models::DocumentRecord;
use crate::state::store::{load_json, save_json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    documents: BTreeMap<String, DocumentRecord>,
}

/// Documents keyed by id, plus the one questions go to by default.
pub struct DocumentRegistry {
    storage_path: PathBuf,
    state: RegistryFile,
}

impl DocumentRegistry {
    pub const FILE_NAME: &'static str = "documents.json";

    pub async fn open(state_dir: &Path) -> Result<Self> {
        let storage_path = state_dir.join(Self::FILE_NAME);
        let state: RegistryFile = load_json(&storage_path).await?;
        info!("Loaded {} registered documents", state.documents.len());

        Ok(Self {
            storage_path,
            state,
        })
    }

    /// Registry that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            storage_path: PathBuf::new(),
            state: RegistryFile::default(),
        }
    }

    pub async fn save(&self) -> Result<()> {
        if self.storage_path.as_os_str().is_empty() {
            return Ok(());
        }
        save_json(&self.storage_path, &self.state).await
    }

    /// Inserts or replaces a record, returning the previous one.
    pub fn upsert(&mut self, record: DocumentRecord) -> Option<DocumentRecord> {
        self.state.documents.insert(record.doc_id.clone(), record)
    }

    pub fn get(&self, doc_id: &str) -> Option<&DocumentRecord> {
        self.state.documents.get(doc_id)
    }

    pub fn require(&self, doc_id: &str) -> Result<&DocumentRecord> {
        self.get(doc_id)
            .ok_or_else(|| AssistantError::DocumentNotFound(doc_id.to_string()))
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.state.documents.contains_key(doc_id)
    }

    pub fn list(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.state.documents.values()
    }

    pub fn len(&self) -> usize {
        self.state.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.documents.is_empty()
    }

    pub fn remove(&mut self, doc_id: &str) -> Option<DocumentRecord> {
        if self.state.active.as_deref() == Some(doc_id) {
            self.state.active = None;
        }
        self.state.documents.remove(doc_id)
    }

    pub fn clear(&mut self) {
        self.state.documents.clear();
        self.state.active = None;
    }

    pub fn set_active(&mut self, doc_id: &str) -> Result<()> {
        if !self.contains(doc_id) {
            return Err(AssistantError::DocumentNotFound(doc_id.to_string()));
        }
        self.state.active = Some(doc_id.to_string());
        Ok(())
    }

    pub fn active(&self) -> Option<&DocumentRecord> {
        self.state.active.as_deref().and_then(|id| self.get(id))
    }

    /// The explicit id when given, otherwise the active document.
    pub fn resolve(&self, doc_id: Option<&str>) -> Option<&DocumentRecord> {
        match doc_id {
            Some(id) => self.get(id),
            None => self.active(),
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.list().map(|r| r.stats.total_chunks).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStats;
    use tempfile::tempdir;

    fn record(name: &str) -> DocumentRecord {
        DocumentRecord::new(
            name.to_string(),
            format!("/tmp/{}", name),
            "some text",
            DocumentStats {
                total_words: 2,
                total_characters: 9,
                total_chunks: 1,
                total_pages: 1,
            },
            4000,
        )
    }

    #[tokio::test]
    async fn test_registry_persistence() {
        let dir = tempdir().unwrap();

        {
            let mut registry = DocumentRegistry::open(dir.path()).await.unwrap();
            assert!(registry.is_empty());
            registry.upsert(record("Jane Doe.pdf"));
            registry.upsert(record("john.pdf"));
            registry.set_active("Jane_Doe").unwrap();
            registry.save().await.unwrap();
        }

        let registry = DocumentRegistry::open(dir.path()).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active().unwrap().filename, "Jane Doe.pdf");
        assert_eq!(registry.resolve(Some("john")).unwrap().doc_id, "john");
        assert_eq!(registry.total_chunks(), 2);
    }

    #[test]
    fn test_remove_clears_active() {
        let mut registry = DocumentRegistry::in_memory();
        registry.upsert(record("a.pdf"));
        registry.set_active("a").unwrap();

        assert!(registry.remove("a").is_some());
        assert!(registry.active().is_none());
        assert!(registry.set_active("a").is_err());
        assert!(matches!(
            registry.require("a"),
            Err(AssistantError::DocumentNotFound(_))
        ));
    }
}
