use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ReportError;

/// A chat-completion backend that turns one prompt into one answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ReportError>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatAnswer,
}

#[derive(Debug, Deserialize)]
struct ChatAnswer {
    #[serde(default)]
    content: String,
}

/// Local Ollama server, non-streaming `/api/chat`.
pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaChat {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn complete(&self, prompt: &str) -> Result<String, ReportError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        log::debug!("Sending report prompt to {} ({})", self.endpoint(), self.model);
        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(ReportError::Unavailable)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Api { status, body });
        }

        let parsed: ChatResponse = response.json().await.map_err(ReportError::Unavailable)?;
        Ok(parsed.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let payload = ChatRequest {
            model: "llama3",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama3",
                "messages": [{ "role": "user", "content": "hi" }],
                "stream": false
            })
        );
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let chat = OllamaChat::new(reqwest::Client::new(), "http://localhost:11434/", "llama3");
        assert_eq!(chat.endpoint(), "http://localhost:11434/api/chat");
        assert_eq!(chat.model_name(), "llama3");
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"model":"llama3","message":{"role":"assistant","content":"Bericht"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(parsed.message.content, "Bericht");
    }
}
