//! Groq-compatible chat-completions client

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// Chat-completions client
///
/// The API key is optional at construction; `chat` raises a configuration
/// error on first use when it is absent.
pub struct LlmClient {
    client: Client,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig, api_key: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Llm(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
        })
    }

    /// Send a single-turn prompt and return the completion text.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Config("missing GROQ_API_KEY".to_string()))?;

        debug!(model = %self.model, "chat completion request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": 0,
                "max_tokens": self.max_tokens,
            }))
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("chat API error {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Llm("chat API returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(url: String) -> LlmConfig {
        LlmConfig {
            api_url: url,
            model: "test-model".to_string(),
            max_tokens: 64,
            timeout_ms: 5000,
        }
    }

    #[tokio::test]
    async fn test_chat_returns_completion_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
            .create_async()
            .await;

        let client = LlmClient::new(
            &test_config(server.url()),
            Some(SecretString::new("key".to_string())),
        )
        .unwrap();
        let answer = client.chat("say hello").await.unwrap();
        assert_eq!(answer, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_config_error() {
        let client = LlmClient::new(&test_config("http://unused".to_string()), None).unwrap();
        let result = client.chat("anything").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_api_error_status_surfaces() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = LlmClient::new(
            &test_config(server.url()),
            Some(SecretString::new("key".to_string())),
        )
        .unwrap();
        let result = client.chat("anything").await;
        assert!(matches!(result, Err(Error::Llm(_))));
    }
}
