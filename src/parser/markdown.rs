// file: src/parser/markdown.rs
// description: renders model markdown output into plain structured lines
// reference: https://docs.rs/pulldown-cmark

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Heading(u32),
    Bullet(usize),
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub kind: LineKind,
    pub text: String,
}

pub struct MarkdownRenderer;

fn flush(kind: &LineKind, text: &mut String, lines: &mut Vec<RenderedLine>) {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        lines.push(RenderedLine {
            kind: kind.clone(),
            text: collapsed,
        });
    }
    text.clear();
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, content: &str) -> Vec<RenderedLine> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_kind = LineKind::Paragraph;
        let mut list_depth = 0usize;

        for event in Parser::new(content) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    flush(&current_kind, &mut current, &mut lines);
                    current_kind = LineKind::Heading(level as u32);
                }
                Event::End(TagEnd::Heading(_)) => {
                    flush(&current_kind, &mut current, &mut lines);
                    current_kind = LineKind::Paragraph;
                }
                Event::Start(Tag::List(_)) => {
                    flush(&current_kind, &mut current, &mut lines);
                    list_depth += 1;
                }
                Event::End(TagEnd::List(_)) => {
                    flush(&current_kind, &mut current, &mut lines);
                    list_depth = list_depth.saturating_sub(1);
                    current_kind = if list_depth > 0 {
                        LineKind::Bullet(list_depth - 1)
                    } else {
                        LineKind::Paragraph
                    };
                }
                Event::Start(Tag::Item) => {
                    flush(&current_kind, &mut current, &mut lines);
                    current_kind = LineKind::Bullet(list_depth.saturating_sub(1));
                }
                Event::End(TagEnd::Item) | Event::End(TagEnd::Paragraph) => {
                    flush(&current_kind, &mut current, &mut lines);
                    if list_depth == 0 {
                        current_kind = LineKind::Paragraph;
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    current.push_str(&text);
                }
                Event::SoftBreak => current.push(' '),
                Event::HardBreak => flush(&current_kind, &mut current, &mut lines),
                _ => {}
            }
        }

        flush(&current_kind, &mut current, &mut lines);
        lines
    }

    /// Plain text with dashed bullets and upper-cased headings.
    pub fn to_plain_text(&self, content: &str) -> String {
        self.render(content)
            .into_iter()
            .map(|line| match line.kind {
                LineKind::Heading(_) => format!("\n{}", line.text.to_uppercase()),
                LineKind::Bullet(depth) => format!("{}- {}", "  ".repeat(depth), line.text),
                LineKind::Paragraph => line.text,
            })
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
