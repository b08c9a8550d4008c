use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Instant;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Result, SkillHubError};
use crate::models::{ChatRequest, ChatResponse};
use crate::retry::RetryPolicy;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;
}

/// Chat-completion client for any OpenAI-compatible endpoint
pub struct ChatTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl ChatTransport {
    pub fn new(cfg: &LlmConfig, retry: RetryPolicy) -> Result<Self> {
        if cfg.api_key.is_empty() {
            return Err(SkillHubError::Config(
                "LLM API key is empty; set GEMINI_API_KEY".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            endpoint: completions_url(&cfg.base_url),
            api_key: cfg.api_key.clone(),
            retry,
        })
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl Transport for ChatTransport {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let start_time = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;

            let error = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(req)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json().await.map_err(SkillHubError::from);
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error = SkillHubError::Api {
                        status: status.as_u16(),
                        body,
                    };
                    if !is_retryable(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => SkillHubError::Http(e),
            };

            if !self.retry.should_retry(attempts, start_time.elapsed()) {
                tracing::error!(
                    "Chat completion failed after {} attempts: {}",
                    attempts,
                    error
                );
                return Err(error);
            }

            let delay = self.retry.delay_for(attempts);
            tracing::warn!(
                "Chat completion attempt {} failed: {} - retrying in {}ms",
                attempts,
                error,
                delay.as_millis()
            );
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::ChatMessage;

    #[test]
    fn test_completions_url_joins_cleanly() {
        assert_eq!(
            completions_url("https://generativelanguage.googleapis.com/v1beta/openai/"),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(
            completions_url("http://localhost:11434/v1"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let cfg = Config::default();
        assert!(matches!(
            ChatTransport::new(&cfg.llm, RetryPolicy::default()),
            Err(SkillHubError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_transport_live() {
        // Only runs against the real endpoint when a key is present.
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            let mut cfg = Config::default();
            cfg.llm.api_key = api_key;
            let transport = match ChatTransport::new(&cfg.llm, RetryPolicy::default()) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Failed to create transport in test: {e}");
                    return;
                }
            };
            let req = ChatRequest {
                model: cfg.llm.model.clone(),
                messages: vec![ChatMessage::user("What is the capital of France?")],
                temperature: 0.0,
                max_tokens: 100,
            };
            let res = transport.chat(&req).await;
            assert!(res.is_ok());
        }
    }
}
