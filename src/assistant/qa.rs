// file: src/assistant/qa.rs
// description: retrieval augmented question answering over one document
// reference: internal module structure

use crate::config::RetrievalConfig;
use crate::database::{ChunkIndex, Embedder};
use crate::error::{AssistantError, Result};
use crate::llm::prompts::{condense_request, is_statistics_question, qa_request};
use crate::llm::{ChatModel, strip_answer_prefix};
use crate::models::{Answer, DocumentRecord, ScoredChunk};
use crate::state::{DocumentRegistry, SessionStore};
use crate::utils::logging::format_count;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const STATISTICS_SOURCE: &str = "Calculated from document";

pub struct DocumentAssistant<M, I> {
    llm: Arc<M>,
    index: Arc<I>,
    embedder: Arc<Embedder>,
    settings: RetrievalConfig,
}

impl<M: ChatModel, I: ChunkIndex> DocumentAssistant<M, I> {
    pub fn new(
        llm: Arc<M>,
        index: Arc<I>,
        embedder: Arc<Embedder>,
        settings: RetrievalConfig,
    ) -> Self {
        Self {
            llm,
            index,
            embedder,
            settings,
        }
    }

    /// Answers `question` about one document and records the exchange in the session.
    ///
    /// An unknown or empty document yields a prompt to ingest one first rather than an
    /// error. Model failures are returned as errors and leave the session untouched.
    pub async fn ask_question(
        &self,
        registry: &DocumentRegistry,
        sessions: &mut SessionStore,
        doc_id: Option<&str>,
        question: &str,
        session_id: &str,
    ) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::Validation(
                "Question cannot be empty".to_string(),
            ));
        }

        let Some(record) = registry.resolve(doc_id) else {
            return Ok(Answer::no_document(session_id));
        };

        if self.index.count(Some(&record.doc_id)).await? == 0 {
            warn!("Document '{}' has no indexed chunks", record.doc_id);
            return Ok(Answer::no_document(session_id));
        }

        if is_statistics_question(question) {
            let answer = statistics_answer(record);
            let conversation_length = sessions
                .append_exchange(session_id, Some(&record.doc_id), question, &answer)
                .await?;

            return Ok(Answer {
                answer,
                sources: vec![STATISTICS_SOURCE.to_string()],
                session_id: session_id.to_string(),
                conversation_length,
                from_statistics: true,
            });
        }

        let search_query = self.standalone_question(sessions, session_id, question).await;
        let retrieved = self
            .retrieve(&record.doc_id, &search_query, self.settings.qa_top_k)
            .await?;

        let context = retrieved
            .iter()
            .map(ScoredChunk::content)
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = qa_request(
            &context,
            question,
            self.settings.temperature,
            self.settings.max_tokens,
        );
        let raw_answer = self.llm.complete(&request).await?;
        let answer = strip_answer_prefix(&raw_answer);

        let sources = retrieved
            .iter()
            .take(self.settings.source_count)
            .map(|chunk| chunk.preview(self.settings.source_preview_chars))
            .collect();

        let conversation_length = sessions
            .append_exchange(session_id, Some(&record.doc_id), question, &answer)
            .await?;

        info!(
            "Answered question in session {} from {} chunks",
            session_id,
            retrieved.len()
        );

        Ok(Answer {
            answer,
            sources,
            session_id: session_id.to_string(),
            conversation_length,
            from_statistics: false,
        })
    }

    /// Nearest chunks of one document for a free text query.
    pub async fn retrieve(&self, doc_id: &str, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed(query).await?;
        self.index.search(&embedding, k, Some(doc_id)).await
    }

    /// Follow-ups are rewritten against the session history for retrieval.
    /// A failed rewrite falls back to the question as asked.
    async fn standalone_question(
        &self,
        sessions: &SessionStore,
        session_id: &str,
        question: &str,
    ) -> String {
        let history = sessions.history(session_id);
        if !self.settings.condense_history || history.is_empty() {
            return question.to_string();
        }

        match self.llm.complete(&condense_request(history, question)).await {
            Ok(condensed) if !condensed.trim().is_empty() => {
                debug!("Condensed follow-up into: {}", condensed);
                condensed.trim().to_string()
            }
            Ok(_) => question.to_string(),
            Err(e) => {
                warn!("Could not condense follow-up question: {}", e);
                question.to_string()
            }
        }
    }
}

/// Document statistics reply used instead of the model for size questions.
pub fn statistics_answer(record: &DocumentRecord) -> String {
    let stats = &record.stats;
    format!(
        "Document Statistics:\n\nFile: {}\nTotal Words: {}\nCharacters: {}\nChunks: {}\nPages: {}",
        record.filename,
        format_count(stats.total_words),
        format_count(stats.total_characters),
        stats.total_chunks,
        stats.total_pages
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStats;

    #[test]
    fn test_statistics_answer_format() {
        let mut record = DocumentRecord::new(
            "cv.pdf".to_string(),
            "/tmp/cv.pdf".to_string(),
            "text",
            DocumentStats {
                total_words: 12345,
                total_characters: 67890,
                total_chunks: 42,
                total_pages: 3,
            },
            4000,
        );
        record.filename = "Jane Doe CV.pdf".to_string();

        let answer = statistics_answer(&record);
        assert!(answer.contains("File: Jane Doe CV.pdf"));
        assert!(answer.contains("Total Words: 12,345"));
        assert!(answer.contains("Characters: 67,890"));
        assert!(answer.contains("Chunks: 42"));
        assert!(answer.contains("Pages: 3"));
    }
}
