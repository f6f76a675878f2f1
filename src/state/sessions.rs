// file: src/state/sessions.rs
// description: persistent chat sessions keyed by session id
// reference: internal module structure

use crate::error::{AssistantError, Result};
use crate::models::{ChatMessage, ChatSession, ConversationExport, SessionSummary};
use crate::state::store::{load_json, save_json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct SessionStore {
    storage_path: PathBuf,
    sessions: BTreeMap<String, ChatSession>,
}

impl SessionStore {
    pub const FILE_NAME: &'static str = "sessions.json";

    pub async fn open(state_dir: &Path) -> Result<Self> {
        let storage_path = state_dir.join(Self::FILE_NAME);
        let sessions: BTreeMap<String, ChatSession> = load_json(&storage_path).await?;
        debug!("Loaded {} chat sessions", sessions.len());

        Ok(Self {
            storage_path,
            sessions,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            storage_path: PathBuf::new(),
            sessions: BTreeMap::new(),
        }
    }

    pub async fn save(&self) -> Result<()> {
        if self.storage_path.as_os_str().is_empty() {
            return Ok(());
        }
        save_json(&self.storage_path, &self.sessions).await
    }

    /// A fresh id not already in use.
    pub fn new_session_id(&self) -> String {
        loop {
            let id = ChatSession::generate_id();
            if !self.sessions.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn get_or_create(&mut self, session_id: &str, doc_id: Option<&str>) -> &mut ChatSession {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!("Starting chat session {}", session_id);
                ChatSession::new(session_id, doc_id.map(str::to_string))
            })
    }

    pub fn get(&self, session_id: &str) -> Option<&ChatSession> {
        self.sessions.get(session_id)
    }

    pub fn history(&self, session_id: &str) -> &[ChatMessage] {
        self.sessions
            .get(session_id)
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    pub async fn append_exchange(
        &mut self,
        session_id: &str,
        doc_id: Option<&str>,
        question: &str,
        answer: &str,
    ) -> Result<usize> {
        let session = self.get_or_create(session_id, doc_id);
        if session.doc_id.is_none() {
            session.doc_id = doc_id.map(str::to_string);
        }
        session.push_exchange(question, answer);
        let qa_count = session.qa_count();

        self.save().await?;
        Ok(qa_count)
    }

    /// Empties the history but keeps the session. Returns whether it existed.
    pub async fn clear(&mut self, session_id: &str) -> Result<bool> {
        let Some(session) = self.sessions.get_mut(session_id) else {
            return Ok(false);
        };

        session.messages.clear();
        session.updated_at = chrono::Utc::now();
        self.save().await?;
        Ok(true)
    }

    pub async fn delete(&mut self, session_id: &str) -> Result<bool> {
        let existed = self.sessions.remove(session_id).is_some();
        if existed {
            self.save().await?;
        }
        Ok(existed)
    }

    /// Most recently updated first.
    pub fn list(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> =
            self.sessions.values().map(SessionSummary::from).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    pub fn export(&self, session_id: &str) -> Result<ConversationExport> {
        self.sessions
            .get(session_id)
            .map(ConversationExport::from)
            .ok_or_else(|| AssistantError::Validation(format!("Unknown session: {}", session_id)))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_exchanges_persist() {
        let dir = tempdir().unwrap();

        let session_id = {
            let mut store = SessionStore::open(dir.path()).await.unwrap();
            let id = store.new_session_id();
            assert_eq!(id.len(), 8);

            store
                .append_exchange(&id, Some("cv"), "Who is this?", "Jane Doe.")
                .await
                .unwrap();
            let count = store
                .append_exchange(&id, Some("cv"), "Where?", "Berlin.")
                .await
                .unwrap();
            assert_eq!(count, 2);
            id
        };

        let store = SessionStore::open(dir.path()).await.unwrap();
        let history = store.history(&session_id);
        assert_eq!(history.len(), 4);
        assert_eq!(history[2].content, "Where?");
        assert_eq!(store.get(&session_id).unwrap().doc_id.as_deref(), Some("cv"));
    }

    #[tokio::test]
    async fn test_clear_keeps_session() {
        let mut store = SessionStore::in_memory();
        assert!(!store.clear("missing").await.unwrap());

        store.append_exchange("s1", None, "q", "a").await.unwrap();
        assert!(store.clear("s1").await.unwrap());
        assert!(store.history("s1").is_empty());
        assert_eq!(store.len(), 1);

        assert!(store.delete("s1").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_export_and_list() {
        let mut store = SessionStore::in_memory();
        store.append_exchange("s1", Some("cv"), "q1", "a1").await.unwrap();
        store.append_exchange("s2", None, "q2", "a2").await.unwrap();

        let export = store.export("s1").unwrap();
        assert_eq!(export.message_count, 2);
        assert_eq!(export.total_exchanges, 1);
        assert_eq!(export.last_interaction.as_deref(), Some("a1"));
        assert!(store.export("nope").is_err());

        let summaries = store.list();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].updated_at >= summaries[1].updated_at);
        assert!(
            summaries
                .iter()
                .any(|s| s.session_id == "s1" && s.doc_id.as_deref() == Some("cv"))
        );
    }
}
