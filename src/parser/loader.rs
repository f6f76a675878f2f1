// file: src/parser/loader.rs
// description: pdf and plain text loading with page level text extraction
// reference: https://docs.rs/pdf-extract

use crate::error::{AssistantError, Result};
use crate::parser::normalizer::TextNormalizer;
use crate::utils::Validator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub filename: String,
    pub pages: Vec<String>,
}

impl LoadedDocument {
    pub fn full_text(&self) -> String {
        self.pages.join("\n")
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

pub struct DocumentLoader {
    allowed_extensions: Vec<String>,
    max_file_size: u64,
    normalizer: TextNormalizer,
}

impl DocumentLoader {
    pub fn new(allowed_extensions: Vec<String>, max_file_size: u64) -> Self {
        Self {
            allowed_extensions,
            max_file_size,
            normalizer: TextNormalizer::new(),
        }
    }

    pub fn load(&self, path: &Path) -> Result<LoadedDocument> {
        Validator::validate_file_path(path)?;
        let extension = Validator::validate_extension(path, &self.allowed_extensions)?;
        Validator::validate_file_size(path, self.max_file_size)?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        info!("Loading document: {}", filename);

        let raw_pages = match extension.as_str() {
            "pdf" => self.extract_pdf_pages(path, &filename)?,
            "txt" | "text" | "md" => vec![self.read_text(path)?],
            other => {
                return Err(AssistantError::Validation(format!(
                    "No loader available for '.{}' files",
                    other
                )));
            }
        };

        if raw_pages.is_empty() {
            return Err(AssistantError::PdfExtraction {
                file: filename,
                message: "PDF loaded but contains no pages".to_string(),
            });
        }

        let pages: Vec<String> = raw_pages
            .iter()
            .map(|page| self.normalizer.normalize(page))
            .collect();

        if pages.iter().all(|p| p.trim().is_empty()) {
            return Err(AssistantError::PdfExtraction {
                file: filename,
                message: "PDF contains no extractable text. It may be an image-based PDF requiring OCR."
                    .to_string(),
            });
        }

        debug!("Extracted {} pages from {}", pages.len(), filename);

        Ok(LoadedDocument {
            path: path.to_path_buf(),
            filename,
            pages,
        })
    }

    fn extract_pdf_pages(&self, path: &Path, filename: &str) -> Result<Vec<String>> {
        // pdf-extract panics on some malformed files. Needs the default unwind strategy,
        // the release profile must not set `panic = "abort"`.
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path))
            .map_err(|_| AssistantError::PdfExtraction {
                file: filename.to_string(),
                message: "PDF parser aborted on malformed input".to_string(),
            })?;

        extracted.map_err(|e| AssistantError::PdfExtraction {
            file: filename.to_string(),
            message: e.to_string(),
        })
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|source| AssistantError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loader() -> DocumentLoader {
        DocumentLoader::new(vec!["pdf".to_string(), "txt".to_string()], 1024 * 1024)
    }

    #[test]
    fn test_load_text_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "Experience:\r\n\r\n\r\n\r\nSenior engi-\nneer at Acme").unwrap();

        let doc = loader().load(&path).unwrap();
        assert_eq!(doc.filename, "notes.txt");
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0], "Experience:\n\nSenior engineer at Acme");
    }

    #[test]
    fn test_missing_file() {
        let err = loader().load(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_rejects_docx_and_blank_text() {
        let temp = TempDir::new().unwrap();
        let docx = temp.path().join("cv.docx");
        fs::write(&docx, "binary").unwrap();
        assert!(loader().load(&docx).is_err());

        let blank = temp.path().join("blank.txt");
        fs::write(&blank, "  \n \u{c} ").unwrap();
        let err = loader().load(&blank).unwrap_err();
        assert!(err.to_string().contains("no extractable text"));
    }

    #[test]
    fn test_invalid_pdf_reports_extraction_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.pdf");
        fs::write(&path, "this is not a pdf").unwrap();

        let err = loader().load(&path).unwrap_err();
        assert!(matches!(err, AssistantError::PdfExtraction { .. }));
    }

    #[test]
    fn test_release_profile_keeps_unwinding() {
        let manifest = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let release: Vec<&str> = manifest
            .lines()
            .skip_while(|line| line.trim() != "[profile.release]")
            .skip(1)
            .take_while(|line| !line.trim_start().starts_with('['))
            .collect();

        assert!(!release.is_empty());
        assert!(
            !release
                .iter()
                .any(|line| line.replace(' ', "").starts_with("panic=\"abort\""))
        );
    }
}
