// file: src/assistant/comparison.rs
// description: aspect comparison, recommendation and profile extraction across documents
// reference: internal module structure

use crate::config::{ComparisonConfig, DEFAULT_ASPECTS};
use crate::database::{ChunkIndex, Embedder};
use crate::error::{AssistantError, Result};
use crate::llm::prompts::{aspect_query, aspect_request, extraction_request, recommendation_request};
use crate::llm::{ChatModel, strip_json_fence};
use crate::models::{
    AspectComparison, AspectFinding, ComparisonMatrix, ProfileOutcome, ScoredChunk,
    StructuredProfile,
};
use crate::state::DocumentRegistry;
use crate::utils::{OperationTimer, Validator};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const RAW_RESPONSE_CHARS: usize = 200;
const SLOW_COMPARISON: Duration = Duration::from_secs(120);

pub struct Comparator<M, I> {
    llm: Arc<M>,
    index: Arc<I>,
    embedder: Arc<Embedder>,
    settings: ComparisonConfig,
}

impl<M: ChatModel, I: ChunkIndex> Comparator<M, I> {
    pub fn new(
        llm: Arc<M>,
        index: Arc<I>,
        embedder: Arc<Embedder>,
        settings: ComparisonConfig,
    ) -> Self {
        Self {
            llm,
            index,
            embedder,
            settings,
        }
    }

    pub fn validate_selection(&self, doc_ids: &[String]) -> Result<()> {
        Validator::validate_document_count(
            doc_ids.len(),
            self.settings.min_documents,
            self.settings.max_documents,
        )?;

        let mut seen = HashSet::new();
        if let Some(dup) = doc_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(AssistantError::Validation(format!(
                "Document '{}' was selected more than once",
                dup
            )));
        }
        Ok(())
    }

    /// Builds the aspect by document matrix.
    ///
    /// Calls are made one at a time, aspect by aspect. A missing document or a failed
    /// call is recorded in its cell and never aborts the rest of the matrix.
    pub async fn compare_documents(
        &self,
        registry: &DocumentRegistry,
        doc_ids: &[String],
        aspects: &[String],
    ) -> Result<ComparisonMatrix> {
        self.validate_selection(doc_ids)?;

        let aspects: Vec<String> = if aspects.is_empty() {
            DEFAULT_ASPECTS.iter().map(|a| a.to_string()).collect()
        } else {
            aspects.to_vec()
        };

        let timer = OperationTimer::new("document comparison")
            .with_slow_threshold(SLOW_COMPARISON);
        let mut matrix = ComparisonMatrix::new(doc_ids.to_vec());

        for aspect in &aspects {
            let mut findings = Vec::with_capacity(doc_ids.len());

            for doc_id in doc_ids {
                let finding = if !registry.contains(doc_id) {
                    AspectFinding::NotFound
                } else {
                    match self.extract_aspect(doc_id, aspect).await {
                        Ok(text) => AspectFinding::Extracted(text),
                        Err(e) => {
                            warn!("Aspect '{}' failed for {}: {}", aspect, doc_id, e);
                            AspectFinding::Failed(e.to_string())
                        }
                    }
                };
                findings.push((doc_id.clone(), finding));
            }

            timer.checkpoint(&format!("aspect '{}' done", aspect));
            matrix.aspects.push(AspectComparison {
                aspect: aspect.clone(),
                findings,
            });
        }

        timer.finish_with_count(aspects.len() * doc_ids.len());
        Ok(matrix)
    }

    async fn extract_aspect(&self, doc_id: &str, aspect: &str) -> Result<String> {
        let query = self.embedder.embed(&aspect_query(aspect)).await?;
        let chunks = self
            .index
            .search(&query, self.settings.top_k, Some(doc_id))
            .await?;

        debug!(
            "Retrieved {} chunks of {} for aspect '{}'",
            chunks.len(),
            doc_id,
            aspect
        );

        let context = chunks
            .iter()
            .map(ScoredChunk::content)
            .collect::<Vec<_>>()
            .join("\n");

        self.llm
            .complete(&aspect_request(aspect, &context, self.settings.context_chars))
            .await
    }

    /// Overall recommendation in four sections, optionally targeted at a role.
    ///
    /// Reuses `matrix` when given, otherwise compares on the default aspects first.
    pub async fn get_recommendation(
        &self,
        registry: &DocumentRegistry,
        doc_ids: &[String],
        matrix: Option<&ComparisonMatrix>,
        role: Option<&str>,
    ) -> Result<String> {
        let computed;
        let matrix = match matrix {
            Some(existing) => existing,
            None => {
                computed = self.compare_documents(registry, doc_ids, &[]).await?;
                &computed
            }
        };

        let context = recommendation_context(registry, doc_ids, matrix);
        let recommendation = self
            .llm
            .complete(&recommendation_request(&context, role))
            .await?;

        info!("Generated recommendation for {} documents", doc_ids.len());
        Ok(recommendation.trim().to_string())
    }

    pub async fn extract_structured_data(
        &self,
        registry: &DocumentRegistry,
        doc_id: &str,
    ) -> ProfileOutcome {
        let Some(record) = registry.get(doc_id) else {
            return ProfileOutcome::Failed {
                error: "Document not found".to_string(),
            };
        };

        let request = extraction_request(&record.text_excerpt, self.settings.profile_chars);
        let reply = match self.llm.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                return ProfileOutcome::Failed {
                    error: format!("Extraction failed: {}", e),
                };
            }
        };

        match serde_json::from_str::<StructuredProfile>(strip_json_fence(&reply)) {
            Ok(profile) => ProfileOutcome::Parsed { profile },
            Err(e) => {
                warn!("Could not parse structured data for {}: {}", doc_id, e);
                ProfileOutcome::Unparsed {
                    raw_response: Validator::truncate_chars(&reply, RAW_RESPONSE_CHARS)
                        .to_string(),
                }
            }
        }
    }

    /// Profiles for every document, in request order.
    pub async fn extract_profiles(
        &self,
        registry: &DocumentRegistry,
        doc_ids: &[String],
    ) -> Vec<(String, ProfileOutcome)> {
        let mut outcomes = Vec::with_capacity(doc_ids.len());
        for doc_id in doc_ids {
            let outcome = self.extract_structured_data(registry, doc_id).await;
            outcomes.push((doc_id.clone(), outcome));
        }
        outcomes
    }
}

/// Findings grouped per document, the input for the recommendation prompt.
pub fn recommendation_context(
    registry: &DocumentRegistry,
    doc_ids: &[String],
    matrix: &ComparisonMatrix,
) -> String {
    let mut context = String::from("Document Comparison Analysis:\n\n");

    for doc_id in doc_ids {
        let Some(record) = registry.get(doc_id) else {
            continue;
        };

        context.push_str(&format!("\n### Document: {}\n", record.filename));
        for aspect in &matrix.aspects {
            if let Some(finding) = aspect.finding(doc_id) {
                context.push_str(&format!(
                    "**{}:**\n{}\n\n",
                    aspect.aspect,
                    finding.display_text()
                ));
            }
        }
    }

    context
}
