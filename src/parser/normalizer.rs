// file: src/parser/normalizer.rs
// description: cleanup of text extracted from pdf pages
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HYPHEN_BREAK: Regex =
        Regex::new(r"(\p{L})-\n(\p{Ll})").expect("HYPHEN_BREAK regex is valid");
    static ref INLINE_SPACES: Regex =
        Regex::new(r"[ \t\u{a0}]{2,}").expect("INLINE_SPACES regex is valid");
    static ref BLANK_RUNS: Regex = Regex::new(r"\n{3,}").expect("BLANK_RUNS regex is valid");
}

pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, content: &str) -> String {
        let mut normalized = self.normalize_control_chars(content);
        normalized = self.normalize_line_endings(&normalized);
        normalized = HYPHEN_BREAK.replace_all(&normalized, "$1$2").into_owned();
        normalized = INLINE_SPACES.replace_all(&normalized, " ").into_owned();
        normalized = BLANK_RUNS.replace_all(&normalized, "\n\n").into_owned();
        normalized.trim().to_string()
    }

    fn normalize_control_chars(&self, content: &str) -> String {
        content
            .chars()
            .filter(|&c| c != '\0' && c != '\u{c}')
            .collect()
    }

    fn normalize_line_endings(&self, content: &str) -> String {
        content
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .lines()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
