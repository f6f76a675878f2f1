// file: src/exporter/pdf.rs
// description: comparison report rendering to pdf with built-in fonts
// reference: https://docs.rs/lopdf

use crate::error::{AssistantError, Result};
use crate::models::chart::parse_hex_color;
use crate::models::{ChartSpec, ComparisonReport};
use crate::parser::{LineKind, MarkdownRenderer};
use crate::utils::Validator;
use crate::utils::logging::format_count;
use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::path::Path;
use tracing::info;

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 210.0 * MM;
const PAGE_HEIGHT: f32 = 297.0 * MM;
const MARGIN_LEFT: f32 = 10.0 * MM;
const MARGIN_RIGHT: f32 = 10.0 * MM;
const MARGIN_TOP: f32 = 10.0 * MM;
const MARGIN_BOTTOM: f32 = 15.0 * MM;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.52;

pub const REPORT_TITLE: &str = "Document Comparison Report";
const RECOMMENDATION_CHARS: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Maps text to WinAnsi bytes; characters outside Latin-1 become `?`.
pub fn to_latin1(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => bytes.push(b'\''),
            '\u{201c}' | '\u{201d}' => bytes.push(b'"'),
            '\u{2013}' | '\u{2014}' | '\u{2022}' => bytes.push(b'-'),
            '\u{2026}' => bytes.extend_from_slice(b"..."),
            '\t' => bytes.push(b' '),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0xff => bytes.push(c as u32 as u8),
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Greedy word wrap to `max_width` points; overlong words are split.
fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head = Validator::truncate_chars(&word, max_chars).to_string();
            word = word[head.len()..].to_string();
            lines.push(head);
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = text.replace('\r', "");
    while out.contains("\n\n") {
        out = out.replace("\n\n", "\n");
    }
    out
}

/// Page content accumulated top to bottom with automatic page breaks.
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    fn new_page(&mut self) {
        if !self.current.is_empty() {
            let finished = std::mem::take(&mut self.current);
            self.pages.push(finished);
        }
        self.y = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
        if self.y < MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn line(&mut self, text: &str, font: Font, size: f32, line_height: f32, indent: f32, align: Align) {
        self.ensure_space(line_height);
        let baseline = self.y - line_height * 0.5 - size * 0.35;
        let x = match align {
            Align::Left => MARGIN_LEFT + indent,
            Align::Center => ((PAGE_WIDTH - text_width(text, size)) / 2.0).max(MARGIN_LEFT),
        };

        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource().as_bytes().to_vec()), Object::Real(size)],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(to_latin1(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        self.y -= line_height;
    }

    fn paragraph(&mut self, text: &str, font: Font, size: f32, line_height: f32, indent: f32) {
        let width = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT - indent;
        for line in wrap_text(text, size, width) {
            self.line(&line, font, size, line_height, indent, Align::Left);
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: (u8, u8, u8)) {
        let (r, g, b) = color;
        self.current.extend([
            Operation::new(
                "rg",
                vec![
                    Object::Real(r as f32 / 255.0),
                    Object::Real(g as f32 / 255.0),
                    Object::Real(b as f32 / 255.0),
                ],
            ),
            Operation::new(
                "re",
                vec![
                    Object::Real(x),
                    Object::Real(y),
                    Object::Real(width),
                    Object::Real(height),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("rg", vec![Object::Real(0.0), Object::Real(0.0), Object::Real(0.0)]),
        ]);
    }

    /// Horizontal bars, one row per point, scaled per series.
    fn bar_chart(&mut self, chart: &ChartSpec) {
        const ROW: f32 = 5.5 * MM;
        const LABEL_WIDTH: f32 = 55.0 * MM;
        const VALUE_WIDTH: f32 = 25.0 * MM;

        self.ensure_space(10.0 * MM + ROW * chart.bar_count() as f32);
        self.line(&chart.title, Font::Bold, 10.0, 7.0 * MM, 0.0, Align::Left);

        let bar_area = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT - LABEL_WIDTH - VALUE_WIDTH;

        for series in &chart.series {
            let axis = if series.secondary_axis {
                chart.secondary_axis_title.as_deref().unwrap_or(&series.name)
            } else {
                chart.y_axis_title.as_str()
            };
            self.line(
                &format!("{} ({})", series.name, axis),
                Font::Regular,
                8.0,
                5.0 * MM,
                2.0 * MM,
                Align::Left,
            );

            let max = series.max_value();
            for point in &series.points {
                self.ensure_space(ROW);
                let top = self.y;
                let width = if max > 0.0 {
                    (point.value / max) as f32 * bar_area
                } else {
                    0.0
                };

                let label = Validator::shorten(&point.label, 30);
                self.line(&label, Font::Regular, 8.0, ROW, 4.0 * MM, Align::Left);

                let color = parse_hex_color(&point.color).unwrap_or((0x60, 0x60, 0x60));
                let bar_x = MARGIN_LEFT + LABEL_WIDTH;
                if width > 0.0 {
                    self.rect(bar_x, top - ROW + 1.0 * MM, width, ROW - 2.0 * MM, color);
                }

                self.current.extend([
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Real(8.0)],
                    ),
                    Operation::new(
                        "Td",
                        vec![
                            Object::Real(bar_x + width + 2.0 * MM),
                            Object::Real(top - ROW * 0.5 - 8.0 * 0.35),
                        ],
                    ),
                    Operation::new(
                        "Tj",
                        vec![Object::String(to_latin1(&point.text), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                ]);
            }
        }
        self.gap(4.0 * MM);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

pub struct PdfReportWriter {
    markdown: MarkdownRenderer,
}

impl PdfReportWriter {
    pub fn new() -> Self {
        Self {
            markdown: MarkdownRenderer::new(),
        }
    }

    pub fn write(&self, report: &ComparisonReport, path: &Path) -> Result<()> {
        let bytes = self.render(report)?;
        std::fs::write(path, bytes).map_err(|source| AssistantError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote comparison report to {}", path.display());
        Ok(())
    }

    pub fn render(&self, report: &ComparisonReport) -> Result<Vec<u8>> {
        let mut layout = PageLayout::new();
        self.layout_report(report, &mut layout);
        Self::assemble(layout.finish())
    }

    fn layout_report(&self, report: &ComparisonReport, layout: &mut PageLayout) {
        layout.line(REPORT_TITLE, Font::Bold, 16.0, 10.0 * MM, 0.0, Align::Center);
        let generated = report.generated_at.with_timezone(&Local);
        layout.line(
            &format!("Generated: {}", generated.format("%Y-%m-%d %H:%M")),
            Font::Regular,
            10.0,
            10.0 * MM,
            0.0,
            Align::Center,
        );
        layout.gap(10.0 * MM);

        layout.line("Documents Compared:", Font::Bold, 12.0, 10.0 * MM, 0.0, Align::Left);
        for doc in &report.documents {
            layout.line(
                &format!("  - {}", Validator::shorten(&doc.filename, 50)),
                Font::Regular,
                10.0,
                8.0 * MM,
                0.0,
                Align::Left,
            );
        }
        layout.gap(5.0 * MM);

        layout.line("Document Statistics:", Font::Bold, 12.0, 10.0 * MM, 0.0, Align::Left);
        for doc in &report.documents {
            layout.line(
                &format!("{}:", Validator::shorten(&doc.filename, 40)),
                Font::Regular,
                9.0,
                6.0 * MM,
                0.0,
                Align::Left,
            );
            for detail in [
                format!("  Words: {}", format_count(doc.stats.total_words)),
                format!("  Sections: {}", doc.stats.total_chunks),
            ] {
                layout.line(&detail, Font::Regular, 9.0, 5.0 * MM, 0.0, Align::Left);
            }
            layout.gap(2.0 * MM);
        }
        layout.gap(5.0 * MM);

        if !report.matrix.aspects.is_empty() {
            layout.line("Detailed Comparison:", Font::Bold, 12.0, 10.0 * MM, 0.0, Align::Left);

            for aspect in &report.matrix.aspects {
                layout.ensure_space(20.0 * MM);
                layout.gap(4.0 * MM);
                layout.line(
                    &format!("{}:", Validator::shorten(&title_case(&aspect.aspect), 60)),
                    Font::Bold,
                    11.0,
                    8.0 * MM,
                    0.0,
                    Align::Left,
                );

                for (doc_id, finding) in &aspect.findings {
                    let name = Validator::shorten(report.display_name(doc_id), 30);
                    let content =
                        Validator::shorten(&collapse_whitespace(&finding.display_text()), 250);
                    layout.paragraph(
                        &format!("{}: {}", name, content),
                        Font::Regular,
                        8.0,
                        5.0 * MM,
                        5.0 * MM,
                    );
                    layout.gap(2.0 * MM);
                }
            }
        }

        if !report.charts.is_empty() {
            layout.gap(4.0 * MM);
            layout.line("Charts:", Font::Bold, 12.0, 10.0 * MM, 0.0, Align::Left);
            for chart in &report.charts {
                layout.bar_chart(chart);
            }
        }

        if let Some(recommendation) = report.recommendation.as_deref() {
            layout.new_page();
            layout.line("AI Recommendation:", Font::Bold, 14.0, 10.0 * MM, 0.0, Align::Left);

            let text = collapse_blank_lines(recommendation);
            let text = Validator::truncate_chars(&text, RECOMMENDATION_CHARS);

            for line in self.markdown.render(text) {
                match line.kind {
                    LineKind::Heading(_) => {
                        layout.gap(2.0 * MM);
                        layout.paragraph(&line.text, Font::Bold, 10.0, 6.0 * MM, 0.0);
                    }
                    LineKind::Bullet(depth) => layout.paragraph(
                        &format!("- {}", line.text),
                        Font::Regular,
                        9.0,
                        5.0 * MM,
                        4.0 * MM * (depth as f32 + 1.0),
                    ),
                    LineKind::Paragraph => {
                        layout.paragraph(&line.text, Font::Regular, 9.0, 5.0 * MM, 0.0)
                    }
                }
            }
        }
    }

    fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let encoded = content
                .encode()
                .map_err(|e| AssistantError::Serialization(format!("PDF content: {}", e)))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| AssistantError::Serialization(format!("PDF output: {}", e)))?;
        Ok(bytes)
    }
}

impl Default for PdfReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AspectComparison, AspectFinding, ComparisonMatrix, DocumentStats, ReportDocument,
    };
    use pretty_assertions::assert_eq;

    fn report(findings: usize) -> ComparisonReport {
        let documents = vec![
            ReportDocument {
                doc_id: "jane".to_string(),
                filename: "jane.pdf".to_string(),
                stats: DocumentStats::default(),
            },
            ReportDocument {
                doc_id: "john".to_string(),
                filename: "john.pdf".to_string(),
                stats: DocumentStats::default(),
            },
        ];
        let mut matrix = ComparisonMatrix::new(vec!["jane".to_string(), "john".to_string()]);
        for i in 0..findings {
            matrix.aspects.push(AspectComparison {
                aspect: format!("aspect number {}", i),
                findings: vec![
                    (
                        "jane".to_string(),
                        AspectFinding::Extracted("- Rust\n- Go ".repeat(30)),
                    ),
                    ("john".to_string(), AspectFinding::NotFound),
                ],
            });
        }
        ComparisonReport::new(documents, matrix)
    }

    #[test]
    fn test_to_latin1() {
        assert_eq!(to_latin1("café"), b"caf\xe9".to_vec());
        assert_eq!(to_latin1("“quoted” – ok"), b"\"quoted\" - ok".to_vec());
        assert_eq!(to_latin1("日本"), b"??".to_vec());
        assert_eq!(to_latin1("a\u{7}b"), b"ab".to_vec());
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("alpha beta gamma delta", 10.0, 10.0 * 0.52 * 11.5);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);

        let long = wrap_text(&"x".repeat(25), 10.0, 10.0 * 0.52 * 10.5);
        assert_eq!(long.len(), 3);
        assert!(wrap_text("   ", 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_helpers() {
        assert_eq!(title_case("skills and technologies"), "Skills And Technologies");
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\r\n"), "a\nb\n");
        assert_eq!(collapse_whitespace(" a \n b\t c "), "a b c");
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = PdfReportWriter::new().render(&report(2)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let loaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_long_report_breaks_pages_and_recommendation_starts_new_page() {
        let mut long = report(25);
        long.recommendation = Some("## Overall Recommendation\n\nJane.\n\n- Strong Rust".to_string());

        let bytes = PdfReportWriter::new().render(&long).unwrap();
        let loaded = Document::load_mem(&bytes).unwrap();
        assert!(loaded.get_pages().len() >= 3);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        PdfReportWriter::new().write(&report(1), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
