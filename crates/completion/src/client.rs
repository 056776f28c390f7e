//! HTTP client and wire types for the chat-completions endpoint.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    CompletionConfig, CompletionError, MAX_COMPLETION_TOKENS, REQUEST_TIMEOUT, SYSTEM_PROMPT,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the completion service.
pub struct CompletionClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl CompletionClient {
    /// Creates a client with a shared connection pool and request timeout.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Generates a short answer for the given prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = self
            .http
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        debug!(prompt_chars = prompt.len(), answer_chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn request_serializes_with_system_prompt_first() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "2+2",
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "2+2");
        assert_eq!(json["max_tokens"], 150);
    }

    #[test]
    fn response_parses_first_choice() {
        let body = r#"{
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  4  "}, "finish_reason": "stop"}
            ],
            "usage": {"total_tokens": 12}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("  4  ")
        );
    }

    /// One-shot HTTP responder: accepts a single connection, consumes the
    /// request, answers with the given status and JSON body.
    async fn one_shot_http(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Read until the request body has arrived (headers + JSON).
            let mut buf = vec![0u8; 64 * 1024];
            let mut total = 0;
            loop {
                let n = stream.read(&mut buf[total..]).await.unwrap();
                total += n;
                let text = String::from_utf8_lossy(&buf[..total]);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length: "))
                        .or_else(|| text.lines().find_map(|l| l.strip_prefix("Content-Length: ")))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if total >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        url
    }

    #[tokio::test]
    async fn generate_returns_trimmed_text() {
        let url = one_shot_http(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":" 4 "}}]}"#,
        )
        .await;

        let mut config = CompletionConfig::new("test-key");
        config.url = url;
        let client = CompletionClient::new(config).unwrap();

        assert_eq!(client.generate("2+2").await.unwrap(), "4");
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let url = one_shot_http(
            "HTTP/1.1 429 Too Many Requests",
            r#"{"error":{"message":"rate limited"}}"#,
        )
        .await;

        let mut config = CompletionConfig::new("test-key");
        config.url = url;
        let client = CompletionClient::new(config).unwrap();

        match client.generate("2+2").await {
            Err(CompletionError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let url = one_shot_http(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#,
        )
        .await;

        let mut config = CompletionConfig::new("test-key");
        config.url = url;
        let client = CompletionClient::new(config).unwrap();

        assert!(matches!(
            client.generate("2+2").await,
            Err(CompletionError::EmptyResponse)
        ));
    }
}
