// file: src/llm/mod.rs
// description: language model client and prompt module exports
// reference: internal module structure

pub mod client;
pub mod prompts;
pub mod response;

pub use client::{ChatModel, ChatRequest, GroqClient, Message, MessageRole};
pub use response::{UNCLEAR_ANSWER, clean_for_display, strip_answer_prefix, strip_json_fence};
