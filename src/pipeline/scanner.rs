// file: src/pipeline/scanner.rs
// description: directory walking and document discovery with filtering
// reference: https://docs.rs/walkdir

use crate::config::DocumentConfig;
use crate::error::Result;
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct FileScanner {
    config: DocumentConfig,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
}

impl FileScanner {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Loadable files under `root`, sorted by relative path.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let max_size = (self.config.max_file_size_mb as u64) * 1024 * 1024;
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            if self.should_skip(&relative_path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            if !self.has_allowed_extension(path) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            let size = metadata.len();
            if size > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path,
                size,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        info!("Found {} documents", files.len());
        Ok(files)
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.config.allowed_extensions.iter().any(|a| a == &ext))
    }

    /// `*.ext` matches a suffix, `dir/*` matches a leading directory, anything else a substring.
    fn should_skip(&self, relative_path: &str) -> bool {
        let normalized = relative_path.replace('\\', "/");

        self.config.skip_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                normalized.ends_with(suffix)
            } else if let Some(dir) = pattern.strip_suffix("/*") {
                normalized.starts_with(&format!("{}/", dir))
                    || normalized.contains(&format!("/{}/", dir))
            } else {
                normalized.contains(pattern.as_str())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(skip_patterns: Vec<&str>) -> DocumentConfig {
        DocumentConfig {
            max_file_size_mb: 1,
            allowed_extensions: vec!["pdf".to_string(), "txt".to_string()],
            chunk_size: 500,
            chunk_overlap: 100,
            parallel_workers: 1,
            skip_patterns: skip_patterns.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_scan_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("cvs")).unwrap();
        fs::write(temp.path().join("cvs/b.txt"), "b").unwrap();
        fs::write(temp.path().join("a.PDF"), "a").unwrap();
        fs::write(temp.path().join("notes.docx"), "x").unwrap();
        fs::write(temp.path().join("big.txt"), vec![b'x'; 2 * 1024 * 1024]).unwrap();

        let files = FileScanner::new(config(vec![]))
            .scan_directory(temp.path())
            .unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "cvs/b.txt"]);
    }

    #[test]
    fn test_skip_patterns() {
        let scanner = FileScanner::new(config(vec!["*.bak.txt", "archive/*", "draft"]));

        assert!(scanner.should_skip("cv.bak.txt"));
        assert!(scanner.should_skip("archive/old.pdf"));
        assert!(scanner.should_skip("2023/archive/old.pdf"));
        assert!(scanner.should_skip("my-draft.pdf"));
        assert!(!scanner.should_skip("cv.pdf"));
    }

    #[test]
    fn test_missing_directory() {
        let scanner = FileScanner::new(config(vec![]));
        assert!(scanner.scan_directory(Path::new("/nonexistent/dir")).is_err());
    }
}
