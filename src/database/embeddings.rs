// file: src/database/embeddings.rs
// description: text embeddings via an OpenAI compatible endpoint with a local trigram fallback
// reference: https://console.groq.com/docs/openai

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::{AssistantError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

const STOP_WORDS: [&str; 33] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what",
];

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

struct RemoteEmbeddingClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl RemoteEmbeddingClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            input: texts,
            model: &self.model,
        };

        debug!(
            "Requesting {} embeddings from {}",
            texts.len(),
            self.url
        );

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AssistantError::Embedding(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::Embedding(format!(
                "Embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AssistantError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(AssistantError::Embedding(format!(
                "Expected {} embeddings, received {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Produces unit-length vectors so cosine similarity equals the dot product.
pub struct Embedder {
    remote: Option<RemoteEmbeddingClient>,
    dimension: usize,
}

impl Embedder {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let remote = match (config.provider, &config.base_url) {
            (EmbeddingProvider::Remote, Some(base_url)) => Some(RemoteEmbeddingClient {
                client: Client::builder()
                    .timeout(Duration::from_secs(60))
                    .build()
                    .unwrap_or_default(),
                url: format!("{}/embeddings", base_url.trim_end_matches('/')),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
            }),
            _ => None,
        };

        Self {
            remote,
            dimension: config.dimension,
        }
    }

    pub fn local(dimension: usize) -> Self {
        Self {
            remote: None,
            dimension,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &str {
        if self.remote.is_some() { "remote" } else { "local-trigram" }
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| AssistantError::Embedding("No embedding returned".to_string()))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(remote) = &self.remote {
            match remote.embed_batch(texts).await {
                Ok(vectors) if vectors.iter().all(|v| v.len() == self.dimension) => {
                    return Ok(vectors.into_iter().map(normalize).collect());
                }
                Ok(vectors) => {
                    warn!(
                        "Remote embeddings have dimension {}, expected {}. Using fallback.",
                        vectors.first().map(Vec::len).unwrap_or(0),
                        self.dimension
                    );
                }
                Err(e) => {
                    warn!("Remote embedding failed: {}. Using fallback.", e);
                }
            }
        }

        Ok(texts
            .iter()
            .map(|text| Self::local_embedding(text, self.dimension))
            .collect())
    }

    /// Deterministic content-aware embedding from hashed words and character trigrams.
    pub fn local_embedding(text: &str, dim: usize) -> Vec<f32> {
        let mut embedding = vec![0.0f32; dim];
        if dim == 0 {
            return embedding;
        }

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, usize> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 1 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash as usize) % dim] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash as usize) % dim] += *freq as f32;
        }

        normalize(embedding)
    }
}

pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_embedding_is_normalized() {
        let embedding = Embedder::local_embedding("Senior Rust engineer with Kubernetes", 384);
        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_local_embedding_deterministic() {
        let emb1 = Embedder::local_embedding("same text", 128);
        let emb2 = Embedder::local_embedding("same text", 128);
        assert_eq!(emb1, emb2);
    }

    #[test]
    fn test_local_embedding_empty_text_is_zero() {
        let embedding = Embedder::local_embedding("", 64);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_related_texts_score_higher() {
        let query = Embedder::local_embedding("programming languages skills", 384);
        let related = Embedder::local_embedding("Skills: Rust, Go and Python programming", 384);
        let unrelated = Embedder::local_embedding("Enjoys hiking mountains on weekends", 384);

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_local_embedder_batch() {
        let embedder = Embedder::local(32);
        assert_eq!(embedder.provider_name(), "local-trigram");

        let texts = vec!["one".to_string(), "two words".to_string()];
        let vectors = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 32));
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }
}
