// file: src/llm/response.rs
// description: cleanup of model replies before display or parsing
// reference: internal module structure

const ANSWER_PREFIXES: [&str; 3] = ["Answer:", "Response:", "A:"];
const ROLE_LABELS: [&str; 5] = ["System:", "Human:", "Assistant:", "Answer:", "Response:"];
const MIN_LINE_CHARS: usize = 5;

pub const UNCLEAR_ANSWER: &str = "I cannot provide a clear answer.";

/// Removes at most one leading answer label.
pub fn strip_answer_prefix(answer: &str) -> String {
    let trimmed = answer.trim();
    for prefix in ANSWER_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Drops role labels and short fragment lines, joining what is left on one line.
pub fn clean_for_display(answer: &str) -> String {
    let mut text = answer.to_string();
    for label in ROLE_LABELS {
        text = text.replace(label, "");
    }

    let cleaned = text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.chars().count() < MIN_LINE_CHARS {
        UNCLEAR_ANSWER.to_string()
    } else {
        cleaned
    }
}

/// Body of a fenced reply with an optional `json` label removed.
pub fn strip_json_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}
