// file: src/exporter/mod.rs
// description: report and conversation export module
// reference: internal module structure

pub mod charts;
pub mod json;
pub mod pdf;

pub use charts::{build_charts, render_terminal};
pub use json::{ExportManifest, JsonExporter};
pub use pdf::PdfReportWriter;
