// file: src/pipeline/ingest.rs
// description: load, chunk, embed and index documents with bounded concurrency
// reference: orchestrates asynchronous ingestion workflow

use crate::config::Config;
use crate::database::{ChunkIndex, Embedder};
use crate::error::{AssistantError, Result};
use crate::models::{Chunk, DocumentRecord, DocumentStats};
use crate::parser::{DocumentChunker, DocumentLoader};
use crate::pipeline::progress::{IngestStats, ProgressTracker};
use crate::pipeline::scanner::FileScanner;
use crate::state::DocumentRegistry;
use crate::utils::Validator;
use crate::utils::logging::format_step;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

const EMBED_BATCH: usize = 64;

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Success(DocumentRecord),
    /// Content unchanged since the last ingest.
    Skipped(DocumentRecord),
    Failed { path: PathBuf, error: String },
}

impl IngestOutcome {
    pub fn record(&self) -> Option<&DocumentRecord> {
        match self {
            Self::Success(record) | Self::Skipped(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

struct PreparedDocument {
    record: DocumentRecord,
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    size: u64,
}

enum Prepared {
    Changed(PreparedDocument),
    Unchanged(DocumentRecord),
}

impl Prepared {
    fn record(&self) -> &DocumentRecord {
        match self {
            Self::Changed(document) => &document.record,
            Self::Unchanged(record) => record,
        }
    }
}

pub struct IngestPipeline<I> {
    loader: Arc<DocumentLoader>,
    chunker: DocumentChunker,
    embedder: Arc<Embedder>,
    index: Arc<I>,
    scanner: FileScanner,
    max_concurrent_tasks: usize,
    excerpt_chars: usize,
    show_progress: bool,
}

impl<I: ChunkIndex> IngestPipeline<I> {
    pub fn new(config: &Config, embedder: Arc<Embedder>, index: Arc<I>) -> Result<Self> {
        let loader = DocumentLoader::new(
            config.documents.allowed_extensions.clone(),
            config.max_file_size_bytes(),
        );
        let chunker =
            DocumentChunker::new(config.documents.chunk_size, config.documents.chunk_overlap)?;

        Ok(Self {
            loader: Arc::new(loader),
            chunker,
            embedder,
            index,
            scanner: FileScanner::new(config.documents.clone()),
            max_concurrent_tasks: config.documents.parallel_workers.max(1),
            excerpt_chars: config.comparison.profile_chars,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .scanner
            .scan_directory(dir)?
            .into_iter()
            .map(|file| file.path)
            .collect())
    }

    /// Ingests one file. Failures are returned as errors rather than a `Failed` outcome.
    pub async fn process_document(
        &self,
        registry: &mut DocumentRegistry,
        path: &Path,
        force: bool,
    ) -> Result<IngestOutcome> {
        let known = Self::known_documents(registry);
        let prepared = self.prepare(path, &known, force, 1, 1).await?;
        // A failed commit unregisters the document, so save either way.
        let outcome = self.commit(registry, prepared).await;
        registry.save().await?;
        outcome
    }

    /// Ingests many files, preparing up to `parallel_workers` at once.
    ///
    /// Outcomes come back in input order. Index writes and registry updates happen one
    /// document at a time after preparation.
    pub async fn process_multiple_documents(
        &self,
        registry: &mut DocumentRegistry,
        paths: &[PathBuf],
        force: bool,
    ) -> Result<(Vec<IngestOutcome>, IngestStats)> {
        let total = paths.len();
        let progress = if self.show_progress {
            ProgressTracker::new(total)
        } else {
            ProgressTracker::hidden(total)
        };

        info!(
            "Processing {} documents with {} concurrent tasks",
            total, self.max_concurrent_tasks
        );

        let known = Self::known_documents(registry);
        let known = &known;

        let mut prepared: Vec<(usize, Result<Prepared>)> = stream::iter(paths.iter().enumerate())
            .map(|(idx, path)| async move {
                (idx, self.prepare(path, known, force, idx + 1, total).await)
            })
            .buffer_unordered(self.max_concurrent_tasks)
            .collect()
            .await;
        prepared.sort_by_key(|(idx, _)| *idx);

        let mut outcomes = Vec::with_capacity(total);
        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut registry_changed = false;
        for (idx, result) in prepared {
            let path = &paths[idx];
            let committed = match result {
                Ok(prepared) => {
                    let record = prepared.record();
                    match claimed.get(&record.doc_id) {
                        Some(earlier) => Err(AssistantError::Validation(format!(
                            "Document id '{}' is already taken by {} in this batch",
                            record.doc_id, earlier
                        ))),
                        None => {
                            claimed.insert(record.doc_id.clone(), record.filename.clone());
                            let changed = matches!(prepared, Prepared::Changed(_));
                            registry_changed |= changed;
                            self.commit(registry, prepared).await
                        }
                    }
                }
                Err(e) => Err(e),
            };

            match committed {
                Ok(outcome) => {
                    match &outcome {
                        IngestOutcome::Success(record) => {
                            progress.inc_processed(record.stats.total_chunks);
                            if let Ok(meta) = std::fs::metadata(path) {
                                progress.add_bytes_processed(meta.len());
                            }
                        }
                        _ => progress.inc_skipped(),
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!("{}", format_step(idx + 1, total, &format!("Error: {}", e)));
                    progress.inc_failed();
                    outcomes.push(IngestOutcome::Failed {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if registry_changed {
            registry.save().await?;
        }

        let stats = progress.get_stats();
        progress.finish();
        Self::log_final_stats(&stats);

        Ok((outcomes, stats))
    }

    fn known_documents(registry: &DocumentRegistry) -> HashMap<String, DocumentRecord> {
        registry
            .list()
            .map(|record| (record.doc_id.clone(), record.clone()))
            .collect()
    }

    async fn prepare(
        &self,
        path: &Path,
        known: &HashMap<String, DocumentRecord>,
        force: bool,
        step: usize,
        total: usize,
    ) -> Result<Prepared> {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        info!("{}", format_step(step, total, &format!("Processing: {}", display_name)));

        let loader = self.loader.clone();
        let owned_path = path.to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || loader.load(&owned_path))
            .await
            .map_err(|e| AssistantError::Validation(format!("Loading task failed: {}", e)))??;

        let doc_id = DocumentRecord::derive_id(&loaded.filename);
        Validator::validate_doc_id(&doc_id)?;

        let chunks = self.chunker.split_pages(&doc_id, &loaded.pages)?;
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let stats =
            DocumentStats::from_chunks(texts.iter().map(String::as_str), loaded.page_count());

        let source_path = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        let record = DocumentRecord::new(
            loaded.filename.clone(),
            source_path,
            &loaded.full_text(),
            stats,
            self.excerpt_chars,
        );

        if !force
            && let Some(existing) = known.get(&doc_id)
            && existing.content_hash == record.content_hash
        {
            info!(
                "{}",
                format_step(step, total, &format!("Unchanged, skipping: {}", display_name))
            );
            return Ok(Prepared::Unchanged(existing.clone()));
        }

        info!(
            "{}",
            format_step(
                step,
                total,
                &format!("Creating embeddings for {} chunks...", chunks.len())
            )
        );

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH) {
            embeddings.extend(self.embedder.embed_batch(batch).await?);
        }

        Ok(Prepared::Changed(PreparedDocument {
            record,
            chunks,
            embeddings,
            size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        }))
    }

    async fn commit(
        &self,
        registry: &mut DocumentRegistry,
        prepared: Prepared,
    ) -> Result<IngestOutcome> {
        let document = match prepared {
            Prepared::Unchanged(record) => return Ok(IngestOutcome::Skipped(record)),
            Prepared::Changed(document) => document,
        };

        let doc_id = document.record.doc_id.clone();
        if registry.contains(&doc_id) {
            warn!("Replacing existing chunks for '{}'", doc_id);
        }

        let written = async {
            self.index.remove_document(&doc_id).await?;
            self.index
                .add_chunks(&document.chunks, &document.embeddings)
                .await
        }
        .await;

        let inserted = match written {
            Ok(inserted) => inserted,
            Err(e) => {
                // Old chunks may already be gone. A stale record would make the next
                // ingest skip this file as unchanged.
                if registry.remove(&doc_id).is_some() {
                    warn!("Unregistered '{}' after a failed index write", doc_id);
                }
                if let Err(cleanup) = self.index.remove_document(&doc_id).await {
                    warn!("Could not clear partial chunks for '{}': {}", doc_id, cleanup);
                }
                return Err(e);
            }
        };

        info!(
            "Completed: {} ({} chunks, {} bytes)",
            document.record.filename, inserted, document.size
        );

        registry.upsert(document.record.clone());
        Ok(IngestOutcome::Success(document.record))
    }

    fn log_final_stats(stats: &IngestStats) {
        info!(
            "Ingestion finished: {} processed, {} skipped, {} failed, {} chunks in {:.1}s",
            stats.documents_processed,
            stats.documents_skipped,
            stats.documents_failed,
            stats.chunks_indexed,
            stats.duration_secs
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryIndex;
    use crate::models::ScoredChunk;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Memory index whose writes can be switched to fail.
    #[derive(Default)]
    struct FlakyIndex {
        inner: MemoryIndex,
        fail_writes: AtomicBool,
    }

    impl ChunkIndex for FlakyIndex {
        async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AssistantError::Database("disk full".to_string()));
            }
            self.inner.add_chunks(chunks, embeddings).await
        }

        async fn search(
            &self,
            query: &[f32],
            k: usize,
            doc_filter: Option<&str>,
        ) -> Result<Vec<ScoredChunk>> {
            self.inner.search(query, k, doc_filter).await
        }

        async fn remove_document(&self, doc_id: &str) -> Result<()> {
            self.inner.remove_document(doc_id).await
        }

        async fn count(&self, doc_filter: Option<&str>) -> Result<usize> {
            self.inner.count(doc_filter).await
        }

        async fn clear(&self) -> Result<()> {
            self.inner.clear().await
        }
    }

    fn pipeline(index: Arc<FlakyIndex>) -> IngestPipeline<FlakyIndex> {
        let config = Config::default_config();
        let embedder = Arc::new(Embedder::local(config.embedding.dimension));
        IngestPipeline::new(&config, embedder, index).unwrap()
    }

    fn write_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_failed_index_write_forgets_document() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "cv.txt", &"Rust engineer with ten years of systems work. ".repeat(40));
        let index = Arc::new(FlakyIndex::default());
        let pipeline = pipeline(index.clone());
        let mut registry = DocumentRegistry::in_memory();

        let outcome = pipeline
            .process_document(&mut registry, &path, false)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert!(index.count(Some("cv")).await.unwrap() > 0);

        index.fail_writes.store(true, Ordering::SeqCst);
        let (outcomes, _) = pipeline
            .process_multiple_documents(&mut registry, std::slice::from_ref(&path), true)
            .await
            .unwrap();
        assert!(matches!(outcomes[0], IngestOutcome::Failed { .. }));
        assert!(!registry.contains("cv"));
        assert_eq!(index.count(Some("cv")).await.unwrap(), 0);

        index.fail_writes.store(false, Ordering::SeqCst);
        let outcome = pipeline
            .process_document(&mut registry, &path, false)
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(
            index.count(Some("cv")).await.unwrap(),
            registry.require("cv").unwrap().stats.total_chunks
        );
    }

    #[tokio::test]
    async fn test_single_document_write_failure_is_saved_unregistered() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "notes.txt", "Short notes about the project timeline.");
        let index = Arc::new(FlakyIndex::default());
        let pipeline = pipeline(index.clone());
        let mut registry = DocumentRegistry::open(dir.path()).await.unwrap();

        pipeline
            .process_document(&mut registry, &path, false)
            .await
            .unwrap();
        index.fail_writes.store(true, Ordering::SeqCst);
        assert!(
            pipeline
                .process_document(&mut registry, &path, true)
                .await
                .is_err()
        );

        let reopened = DocumentRegistry::open(dir.path()).await.unwrap();
        assert!(!reopened.contains("notes"));
    }

    #[tokio::test]
    async fn test_colliding_ids_in_one_batch() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            write_doc(&dir, "a b.txt", "First resume body with Python experience."),
            write_doc(&dir, "a_b.txt", "Second resume body with Go experience."),
        ];
        let index = Arc::new(FlakyIndex::default());
        let pipeline = pipeline(index.clone());
        let mut registry = DocumentRegistry::in_memory();

        let (outcomes, stats) = pipeline
            .process_multiple_documents(&mut registry, &paths, false)
            .await
            .unwrap();

        assert!(outcomes[0].is_success());
        match &outcomes[1] {
            IngestOutcome::Failed { path, error } => {
                assert_eq!(path, &paths[1]);
                assert!(error.contains("a b.txt"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(stats.documents_failed, 1);
        assert_eq!(registry.require("a_b").unwrap().filename, "a b.txt");
    }

    #[tokio::test]
    async fn test_hash_covers_extracted_text() {
        let dir = TempDir::new().unwrap();
        let body = "Page one text about distributed systems and storage engines.";
        let path = write_doc(&dir, "paper.txt", body);
        let pipeline = pipeline(Arc::new(FlakyIndex::default()));
        let mut registry = DocumentRegistry::in_memory();

        pipeline
            .process_document(&mut registry, &path, false)
            .await
            .unwrap();

        let loaded = DocumentLoader::new(vec!["txt".to_string()], 1024 * 1024)
            .load(&path)
            .unwrap();
        assert_eq!(
            registry.require("paper").unwrap().content_hash,
            DocumentRecord::compute_hash(&loaded.full_text())
        );
    }
}
