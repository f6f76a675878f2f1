// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{AssistantError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub database: DatabaseConfig,
    pub documents: DocumentConfig,
    pub retrieval: RetrievalConfig,
    pub comparison: ComparisonConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub table_name: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    pub max_file_size_mb: usize,
    pub allowed_extensions: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub parallel_workers: usize,
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    pub qa_top_k: usize,
    pub source_count: usize,
    pub source_preview_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub condense_history: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComparisonConfig {
    pub top_k: usize,
    pub context_chars: usize,
    pub min_documents: usize,
    pub max_documents: usize,
    pub profile_chars: usize,
    #[serde(default)]
    pub aspects: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub state_dir: PathBuf,
}

pub const DEFAULT_ASPECTS: [&str; 6] = [
    "skills and technologies",
    "work experience and roles",
    "education and certifications",
    "key achievements",
    "overall strengths",
    "potential areas for growth",
];

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| AssistantError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DOCSAGE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AssistantError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| AssistantError::Config(e.to_string()))?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                model: "llama-3.1-8b-instant".to_string(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
                timeout_secs: 60,
            },
            embedding: EmbeddingConfig {
                provider: EmbeddingProvider::Local,
                model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
                dimension: 384,
                base_url: None,
                api_key: None,
            },
            database: DatabaseConfig {
                uri: "data/lancedb".to_string(),
                table_name: "chunks".to_string(),
                batch_size: 100,
            },
            documents: DocumentConfig {
                max_file_size_mb: 10,
                allowed_extensions: vec!["pdf".to_string(), "txt".to_string()],
                chunk_size: 500,
                chunk_overlap: 100,
                parallel_workers: 2,
                skip_patterns: vec![".git/".to_string()],
            },
            retrieval: RetrievalConfig {
                qa_top_k: 6,
                source_count: 3,
                source_preview_chars: 200,
                temperature: 0.1,
                max_tokens: 1024,
                condense_history: true,
            },
            comparison: ComparisonConfig {
                top_k: 3,
                context_chars: 1500,
                min_documents: 2,
                max_documents: 3,
                profile_chars: 4000,
                aspects: vec![],
            },
            storage: StorageConfig {
                state_dir: PathBuf::from("data/state"),
            },
        }
    }

    /// Aspects used when a comparison does not name its own.
    pub fn comparison_aspects(&self) -> Vec<String> {
        if self.comparison.aspects.is_empty() {
            DEFAULT_ASPECTS.iter().map(|a| a.to_string()).collect()
        } else {
            self.comparison.aspects.clone()
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        (self.documents.max_file_size_mb as u64) * 1024 * 1024
    }

    pub fn validate(&self) -> Result<()> {
        if self.documents.chunk_size == 0 {
            return Err(AssistantError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.documents.chunk_overlap >= self.documents.chunk_size {
            return Err(AssistantError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.documents.chunk_overlap, self.documents.chunk_size
            )));
        }

        if self.documents.parallel_workers == 0 {
            return Err(AssistantError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.database.batch_size == 0 {
            return Err(AssistantError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.qa_top_k == 0 || self.comparison.top_k == 0 {
            return Err(AssistantError::Config(
                "retrieval top_k values must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.retrieval.temperature) {
            return Err(AssistantError::Config(format!(
                "temperature {} is outside 0.0..=2.0",
                self.retrieval.temperature
            )));
        }

        if self.embedding.dimension == 0 {
            return Err(AssistantError::Config(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        if self.comparison.min_documents == 0
            || self.comparison.min_documents > self.comparison.max_documents
        {
            return Err(AssistantError::Config(format!(
                "invalid comparison document range {}..={}",
                self.comparison.min_documents, self.comparison.max_documents
            )));
        }

        if self.embedding.provider == EmbeddingProvider::Remote
            && self.embedding.base_url.is_none()
        {
            return Err(AssistantError::Config(
                "remote embedding provider requires embedding.base_url".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.documents.chunk_size, 500);
        assert_eq!(config.documents.chunk_overlap, 100);
        assert_eq!(config.retrieval.qa_top_k, 6);
        assert_eq!(config.comparison_aspects().len(), 6);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = Config::default_config();
        config.documents.chunk_overlap = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_remote_embeddings_need_url() {
        let mut config = Config::default_config();
        config.embedding.provider = EmbeddingProvider::Remote;
        assert!(config.validate().is_err());

        config.embedding.base_url = Some("http://localhost:8080/v1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[documents]\nchunk_size = 800\nchunk_overlap = 50").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.documents.chunk_size, 800);
        assert_eq!(config.documents.chunk_overlap, 50);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_custom_aspects_override_defaults() {
        let mut config = Config::default_config();
        config.comparison.aspects = vec!["budget".to_string()];
        assert_eq!(config.comparison_aspects(), vec!["budget".to_string()]);
    }
}
