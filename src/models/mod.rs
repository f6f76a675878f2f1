// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod answer;
pub mod chart;
pub mod chunk;
pub mod comparison;
pub mod document;
pub mod report;
pub mod search_result;
pub mod session;

pub use answer::Answer;
pub use chart::{ChartPoint, ChartSeries, ChartSpec};
pub use chunk::Chunk;
pub use comparison::{
    AspectComparison, AspectFinding, ComparisonMatrix, ProfileOutcome, StructuredProfile,
};
pub use document::{DocumentRecord, DocumentStats};
pub use report::{ComparisonReport, ReportDocument};
pub use search_result::ScoredChunk;
pub use session::{ChatMessage, ChatSession, ConversationExport, Role, SessionSummary};
