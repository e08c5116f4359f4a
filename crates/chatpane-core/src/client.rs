use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ChatError;

/// Anything that can turn a user message into reply text.
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    /// `fallback` is returned when a well-formed reply carries no usable text.
    async fn fetch_reply(&self, message: &str, fallback: &str) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl ReplyBackend for ChatClient {
    async fn fetch_reply(&self, message: &str, fallback: &str) -> Result<String, ChatError> {
        let url = self.endpoint();
        debug!(%url, chars = message.chars().count(), "posting chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;
        Ok(extract_reply(&value, fallback))
    }
}

/// Pick the reply text out of a decoded success body.
///
/// `response` wins, then `message`; empty or non-string fields fall through
/// to `fallback`.
pub fn extract_reply(body: &Value, fallback: &str) -> String {
    ["response", "message"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FALLBACK: &str = "fallback";

    #[test]
    fn response_field_is_preferred() {
        let body = json!({"response": "hi", "message": "ignored"});
        assert_eq!(extract_reply(&body, FALLBACK), "hi");
    }

    #[test]
    fn message_field_is_used_when_response_missing_or_empty() {
        assert_eq!(extract_reply(&json!({"message": "m"}), FALLBACK), "m");
        assert_eq!(extract_reply(&json!({"response": "", "message": "m"}), FALLBACK), "m");
    }

    #[test]
    fn anything_else_uses_fallback() {
        assert_eq!(extract_reply(&json!({}), FALLBACK), FALLBACK);
        assert_eq!(extract_reply(&json!({"response": 42}), FALLBACK), FALLBACK);
        assert_eq!(extract_reply(&json!(["response"]), FALLBACK), FALLBACK);
        assert_eq!(extract_reply(&json!("text"), FALLBACK), FALLBACK);
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = ChatClient::new("http://localhost:8080/");
        assert_eq!(client.endpoint(), "http://localhost:8080/chat");
    }
}
