// file: src/models/report.rs
// description: comparison report assembled for export
// reference: internal data structures

use crate::models::{ChartSpec, ComparisonMatrix, DocumentRecord, DocumentStats, ProfileOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub doc_id: String,
    pub filename: String,
    pub stats: DocumentStats,
}

impl From<&DocumentRecord> for ReportDocument {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            doc_id: record.doc_id.clone(),
            filename: record.filename.clone(),
            stats: record.stats.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub documents: Vec<ReportDocument>,
    pub matrix: ComparisonMatrix,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub profiles: Vec<(String, ProfileOutcome)>,
    #[serde(default)]
    pub charts: Vec<ChartSpec>,
}

impl ComparisonReport {
    pub fn new(documents: Vec<ReportDocument>, matrix: ComparisonMatrix) -> Self {
        Self {
            generated_at: Utc::now(),
            documents,
            matrix,
            recommendation: None,
            profiles: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// File name for a document id, falling back to the id itself.
    pub fn display_name<'a>(&'a self, doc_id: &'a str) -> &'a str {
        self.documents
            .iter()
            .find(|d| d.doc_id == doc_id)
            .map(|d| d.filename.as_str())
            .unwrap_or(doc_id)
    }
}
