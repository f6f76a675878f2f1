// file: src/llm/prompts.rs
// description: prompt templates for answering, condensing, comparing and extracting
// reference: https://console.groq.com/docs/prompting

use crate::llm::client::{ChatRequest, Message};
use crate::models::{ChatMessage, Role};
use crate::utils::Validator;

pub const QA_SYSTEM_PROMPT: &str = "You are a document assistant. Answer using ONLY the provided context.

Rules:
- Extract facts, names, dates, numbers from context
- If asked for summary, cover main points
- If asked for details, be specific
- If not in context, say: \"I cannot find that information\"
- Do not add information not in context";

pub const CONDENSE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question which might reference context in the chat history, formulate a standalone question which can be understood without the chat history.

Consider:
- Previous questions and answers in the conversation
- References to \"it\", \"this\", \"that\", \"the document\", etc.
- Follow-up questions that build on previous answers

Do NOT answer the question, just reformulate it if needed and otherwise return it as is.";

pub const ASPECT_SYSTEM_PROMPT: &str =
    "You are a document analyzer. Extract specific information concisely in bullet points.";

pub const RECOMMENDATION_SYSTEM_PROMPT: &str =
    "You are an expert analyst providing detailed, actionable recommendations.";

pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a data extraction specialist. Return only valid JSON.";

const STATISTICS_KEYWORDS: [&str; 5] = [
    "how many words",
    "word count",
    "total words",
    "page count",
    "document size",
];

pub const RECOMMENDATION_SECTIONS: [&str; 4] = [
    "Overall Recommendation",
    "Individual Strengths",
    "Best Fit Analysis",
    "Key Differentiators",
];

/// Whether the question can be answered from document statistics alone.
pub fn is_statistics_question(question: &str) -> bool {
    let lowered = question.trim().to_lowercase();
    STATISTICS_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

pub fn qa_request(context: &str, question: &str, temperature: f32, max_tokens: u32) -> ChatRequest {
    ChatRequest::single_turn(
        QA_SYSTEM_PROMPT,
        format!("Context:\n{}\n\nQuestion: {}\n\nAnswer:", context, question),
        temperature,
        max_tokens,
    )
}

/// Rewrites a follow-up into a standalone retrieval query.
pub fn condense_request(history: &[ChatMessage], question: &str) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(CONDENSE_SYSTEM_PROMPT));
    messages.extend(history.iter().map(|m| match m.role {
        Role::User => Message::user(m.content.clone()),
        Role::Assistant => Message::assistant(m.content.clone()),
    }));
    messages.push(Message::user(question));

    ChatRequest::new(messages, 0.0, 256)
}

pub fn aspect_request(aspect: &str, context: &str, context_chars: usize) -> ChatRequest {
    let prompt = format!(
        "Analyze this document section and extract information about {aspect}.
Be specific and concise. List key points as bullet points.

Document section:
{section}

Extract information about {aspect}:",
        aspect = aspect,
        section = Validator::truncate_chars(context, context_chars),
    );

    ChatRequest::single_turn(ASPECT_SYSTEM_PROMPT, prompt, 0.1, 400)
}

pub fn aspect_query(aspect: &str) -> String {
    format!("information about {}", aspect)
}

pub fn recommendation_request(comparison_context: &str, role: Option<&str>) -> ChatRequest {
    let role_context = match role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!(" for the role of '{}'", role),
        None => String::new(),
    };

    let prompt = format!(
        "Based on the document comparison below, provide a comprehensive recommendation{role_context}.

{comparison_context}

Provide your analysis in this format:

## {overall}
[Which document/candidate is the strongest and why - be specific]

## {strengths}
[List key strengths of each candidate]

## {fit}
[Explain which candidate is best suited and why]

## {differentiators}
[What sets the top candidate apart]

Be specific, actionable, and professional.",
        overall = RECOMMENDATION_SECTIONS[0],
        strengths = RECOMMENDATION_SECTIONS[1],
        fit = RECOMMENDATION_SECTIONS[2],
        differentiators = RECOMMENDATION_SECTIONS[3],
    );

    ChatRequest::single_turn(RECOMMENDATION_SYSTEM_PROMPT, prompt, 0.2, 1200)
}

pub fn extraction_request(text: &str, max_chars: usize) -> ChatRequest {
    let prompt = format!(
        r#"Extract structured information from this document.
Provide a JSON response with these fields (use "N/A" if not found):
{{
  "name": "Full name",
  "email": "Email address",
  "phone": "Phone number",
  "skills": ["skill1", "skill2", "skill3"],
  "experience_years": 0,
  "education": ["degree1", "degree2"],
  "certifications": ["cert1", "cert2"],
  "key_achievements": ["achievement1", "achievement2", "achievement3"]
}}

Document text:
{}

Respond with ONLY valid JSON, no other text."#,
        Validator::truncate_chars(text, max_chars)
    );

    ChatRequest::single_turn(EXTRACTION_SYSTEM_PROMPT, prompt, 0.1, 800)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MessageRole;

    #[test]
    fn test_statistics_detection() {
        assert!(is_statistics_question("How many words are in this?"));
        assert!(is_statistics_question("  what is the WORD COUNT "));
        assert!(is_statistics_question("document size please"));
        assert!(!is_statistics_question("Summarize the experience section"));
    }

    #[test]
    fn test_qa_request_layout() {
        let request = qa_request("ctx", "Who?", 0.1, 1024);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, QA_SYSTEM_PROMPT);
        assert_eq!(
            request.user_prompt(),
            Some("Context:\nctx\n\nQuestion: Who?\n\nAnswer:")
        );
    }

    #[test]
    fn test_condense_includes_history_in_order() {
        let history = vec![
            ChatMessage::user("Where did Jane work?"),
            ChatMessage::assistant("At Acme."),
        ];
        let request = condense_request(&history, "For how long?");

        let roles: Vec<MessageRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
        assert_eq!(request.user_prompt(), Some("For how long?"));
    }

    #[test]
    fn test_aspect_request_truncates_context() {
        let context = "x".repeat(3000);
        let request = aspect_request("key achievements", &context, 1500);
        let prompt = request.user_prompt().unwrap();

        assert!(prompt.contains(&"x".repeat(1500)));
        assert!(!prompt.contains(&"x".repeat(1501)));
        assert_eq!(request.max_tokens, 400);
        assert_eq!(aspect_query("key achievements"), "information about key achievements");
    }

    #[test]
    fn test_recommendation_role_context() {
        let with_role = recommendation_request("ctx", Some("Backend Engineer"));
        assert!(
            with_role
                .user_prompt()
                .unwrap()
                .contains("recommendation for the role of 'Backend Engineer'.")
        );

        let without = recommendation_request("ctx", Some("   "));
        let prompt = without.user_prompt().unwrap();
        assert!(prompt.contains("comprehensive recommendation.\n"));
        for section in RECOMMENDATION_SECTIONS {
            assert!(prompt.contains(&format!("## {}", section)));
        }
        assert_eq!(without.temperature, 0.2);
    }

    #[test]
    fn test_extraction_prompt_limits_text() {
        let request = extraction_request(&"y".repeat(5000), 4000);
        let prompt = request.user_prompt().unwrap();
        assert!(prompt.contains(&"y".repeat(4000)));
        assert!(!prompt.contains(&"y".repeat(4001)));
        assert!(prompt.ends_with("Respond with ONLY valid JSON, no other text."));
    }
}
