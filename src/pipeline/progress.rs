// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for document ingestion
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub documents_failed: usize,
    pub chunks_indexed: usize,
    pub total_bytes_processed: u64,
    pub duration_secs: f64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents_per_second(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        self.documents_processed as f64 / self.duration_secs
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.documents_processed + self.documents_failed;
        if total == 0 {
            return 0.0;
        }
        (self.documents_processed as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    processed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    chunks: AtomicUsize,
    bytes_processed: AtomicU64,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_documents: usize) -> Self {
        Self::with_color(total_documents, true)
    }

    pub fn with_color(total_documents: usize, colored: bool) -> Self {
        Self::build(MultiProgress::new(), total_documents, colored)
    }

    /// Tracker that counts but never draws.
    pub fn hidden(total_documents: usize) -> Self {
        Self::build(
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            total_documents,
            false,
        )
    }

    fn build(multi_progress: MultiProgress, total_documents: usize, colored: bool) -> Self {
        let main_bar = create_progress_bar(&multi_progress, total_documents as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            processed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            chunks: AtomicUsize::new(0),
            bytes_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_processed(&self, chunks: usize) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.chunks.fetch_add(chunks, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_bytes_processed(&self, bytes: u64) {
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Ingestion complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> IngestStats {
        IngestStats {
            documents_processed: self.processed.load(Ordering::SeqCst),
            documents_skipped: self.skipped.load(Ordering::SeqCst),
            documents_failed: self.failed.load(Ordering::SeqCst),
            chunks_indexed: self.chunks.load(Ordering::SeqCst),
            total_bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Chunks: {} | Skipped: {} | Failed: {}",
            self.chunks.load(Ordering::SeqCst),
            self.skipped.load(Ordering::SeqCst),
            self.failed.load(Ordering::SeqCst)
        );
        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_stats_calculations() {
        let mut stats = IngestStats::new();
        stats.documents_processed = 3;
        stats.documents_failed = 1;
        stats.duration_secs = 1.5;

        assert_eq!(stats.documents_per_second(), 2.0);
        assert_eq!(stats.success_rate(), 75.0);
    }

    #[test]
    fn test_ingest_stats_zero_duration() {
        let stats = IngestStats::new();
        assert_eq!(stats.documents_per_second(), 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_progress_tracker_counts() {
        let tracker = ProgressTracker::hidden(3);

        tracker.inc_processed(12);
        tracker.inc_skipped();
        tracker.inc_failed();
        tracker.add_bytes_processed(2048);

        let stats = tracker.get_stats();
        assert_eq!(stats.documents_processed, 1);
        assert_eq!(stats.documents_skipped, 1);
        assert_eq!(stats.documents_failed, 1);
        assert_eq!(stats.chunks_indexed, 12);
        assert_eq!(stats.total_bytes_processed, 2048);
    }
}
