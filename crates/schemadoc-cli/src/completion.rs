//! Chat-completion client.
//!
//! One prompt in, one response text out. The concrete client speaks the
//! OpenAI-compatible `/chat/completions` protocol; the trait keeps the
//! pipeline testable without a network.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A collaborator that turns a prompt into response text.
pub trait CompletionClient {
    /// Send a single-turn chat request with one user-role message and
    /// return the model's text. No retries, no response parsing.
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Errors raised while talking to the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("completion API returned no choices")]
    EmptyResponse,

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Build a client for the endpoint at `api_base` (with or without a
    /// trailing slash), authenticating with `api_key`.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let api_base: String = api_base.into();
        Ok(Self {
            http: reqwest::Client::new(),
            runtime: tokio::runtime::Runtime::new()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    async fn complete_async(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
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
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.runtime.block_on(self.complete_async(prompt))
    }
}
