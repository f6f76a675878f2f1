// file: src/llm/client.rs
// description: OpenAI compatible chat completion client for Groq
// reference: https://console.groq.com/docs/openai

use crate::config::LlmConfig;
use crate::error::{AssistantError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens,
        }
    }

    /// System instruction followed by one user turn.
    pub fn single_turn(
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self::new(
            vec![Message::system(system), Message::user(user)],
            temperature,
            max_tokens,
        )
    }

    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// A chat completion backend.
#[allow(async_fn_in_trait)]
pub trait ChatModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct GroqClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GroqClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::Config(
                    "GROQ_API_KEY is not set. Add it to your environment or .env file".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

impl ChatModel for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            "Sending {} messages to {} (temperature {}, max_tokens {})",
            request.messages.len(),
            self.model,
            request.temperature,
            request.max_tokens
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::llm(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::Llm {
                status: Some(status.as_u16()),
                message: error_text,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::llm(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AssistantError::llm("Response contained no choices"))?
            .message
            .content
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(String::from),
            model: "llama-3.1-8b-instant".to_string(),
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        assert!(matches!(
            GroqClient::from_config(&llm_config(None)),
            Err(AssistantError::Config(_))
        ));
        assert!(GroqClient::from_config(&llm_config(Some("  "))).is_err());
    }

    #[test]
    fn test_endpoint_built_from_base_url() {
        let client = GroqClient::from_config(&llm_config(Some("key"))).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(client.model_name(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest::single_turn("sys", "hello", 0.1, 1024);
        let body = CompletionBody {
            model: "m",
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(request.user_prompt(), Some("hello"));
    }

    #[test]
    fn test_response_without_content() {
        let parsed: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());

        let empty: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.choices.is_empty());
    }

    /// Serves one canned HTTP response and returns the base url.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let mut request = Vec::new();
            // the JSON request body is the last thing sent
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.ends_with(b"}") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{}/v1", addr)
    }

    fn local_client(base_url: String) -> GroqClient {
        let mut config = llm_config(Some("key"));
        config.base_url = base_url;
        GroqClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_is_kept() {
        let base_url = serve_once("503 Service Unavailable", r#"{"error":"overloaded"}"#).await;
        let request = ChatRequest::single_turn("sys", "hello", 0.1, 64);

        let err = local_client(base_url).complete(&request).await.unwrap_err();
        match err {
            AssistantError::Llm { status, message } => {
                assert_eq!(status, Some(503));
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected llm error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_successful_completion_is_trimmed() {
        let base_url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"  Rust and Go \n"}}]}"#,
        )
        .await;
        let request = ChatRequest::single_turn("sys", "hello", 0.1, 64);

        let answer = local_client(base_url).complete(&request).await.unwrap();
        assert_eq!(answer, "Rust and Go");
    }
}
