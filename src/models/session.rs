// file: src/models/session.rs
// description: chat session and message history models
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub doc_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(session_id: impl Into<String>, doc_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            doc_id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Short random identifier, eight hex characters of a v4 UUID.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    pub fn push_exchange(&mut self, question: &str, answer: &str) {
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(answer));
        self.updated_at = Utc::now();
    }

    pub fn qa_count(&self) -> usize {
        self.messages.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_interaction(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }

    /// Question/answer pairs in order, skipping any unpaired tail.
    pub fn exchanges(&self) -> impl Iterator<Item = (&ChatMessage, &ChatMessage)> {
        self.messages
            .chunks_exact(2)
            .map(|pair| (&pair[0], &pair[1]))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub doc_id: Option<String>,
    pub qa_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            doc_id: session.doc_id.clone(),
            qa_count: session.qa_count(),
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationExport {
    pub session_id: String,
    pub doc_id: Option<String>,
    pub conversation_history: Vec<ChatMessage>,
    pub message_count: usize,
    pub last_interaction: Option<String>,
    pub total_exchanges: usize,
    pub exported_at: DateTime<Utc>,
}

impl From<&ChatSession> for ConversationExport {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            doc_id: session.doc_id.clone(),
            conversation_history: session.messages.clone(),
            message_count: session.messages.len(),
            last_interaction: session.last_interaction().map(str::to_string),
            total_exchanges: session.qa_count(),
            exported_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = ChatSession::generate_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_exchange_counting() {
        let mut session = ChatSession::new("abc12345", None);
        assert!(session.is_empty());

        session.push_exchange("What is this?", "A resume.");
        session.push_exchange("Whose?", "Jane's.");

        assert_eq!(session.qa_count(), 2);
        assert_eq!(session.last_interaction(), Some("Jane's."));
        let pairs: Vec<_> = session.exchanges().collect();
        assert_eq!(pairs[1].0.content, "Whose?");
        assert_eq!(pairs[1].1.role, Role::Assistant);
    }

    #[test]
    fn test_export_counts() {
        let mut session = ChatSession::new("s1", Some("doc".to_string()));
        session.push_exchange("q", "a");
        let export = ConversationExport::from(&session);
        assert_eq!(export.message_count, 2);
        assert_eq!(export.total_exchanges, 1);
        assert_eq!(export.last_interaction.as_deref(), Some("a"));
    }
}
