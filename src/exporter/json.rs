// file: src/exporter/json.rs
// description: json export of comparison reports and conversations

use crate::error::{AssistantError, Result};
use crate::models::{ComparisonReport, ConversationExport};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
    files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_files: usize,
    pub files: Vec<String>,
}

impl JsonExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| AssistantError::FileOperation {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self {
            output_dir,
            files: Vec::new(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn export_report(&mut self, report: &ComparisonReport, pretty: bool) -> Result<PathBuf> {
        let name = format!(
            "comparison_{}.json",
            report.generated_at.format("%Y%m%d_%H%M%S")
        );
        self.write(&name, report, pretty)
    }

    pub fn export_conversation(
        &mut self,
        conversation: &ConversationExport,
        pretty: bool,
    ) -> Result<PathBuf> {
        let name = format!(
            "conversation_{}_{}.json",
            conversation.session_id,
            conversation.exported_at.format("%Y%m%d_%H%M%S")
        );
        self.write(&name, conversation, pretty)
    }

    /// Writes `manifest.json` listing every file exported by this exporter.
    pub fn write_manifest(&self) -> Result<ExportManifest> {
        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            total_files: self.files.len(),
            files: self.files.clone(),
        };

        let path = self.output_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&path, json).map_err(|source| AssistantError::FileOperation { path, source })?;

        info!("Export complete: {} files", manifest.total_files);
        Ok(manifest)
    }

    fn write<T: Serialize>(&mut self, name: &str, value: &T, pretty: bool) -> Result<PathBuf> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        let path = self.output_dir.join(name);
        fs::write(&path, json).map_err(|source| AssistantError::FileOperation {
            path: path.clone(),
            source,
        })?;

        info!("Exported {}", path.display());
        if !self.files.iter().any(|f| f == name) {
            self.files.push(name.to_string());
        }
        Ok(path)
    }
}
