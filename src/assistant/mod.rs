// file: src/assistant/mod.rs
// description: question answering and comparison module exports
// reference: internal module structure

pub mod comparison;
pub mod qa;

pub use comparison::{Comparator, recommendation_context};
pub use qa::{DocumentAssistant, STATISTICS_SOURCE, statistics_answer};
