//! # Tweet generation
//!
//! [`GenerationClient`] turns an [`Item`] into a prompt, hands it to a
//! [`TextBackend`] and always comes back with some text: the generated tweet, or
//! [`FALLBACK_TEXT`] when anything went wrong.
//!
//! Two backends are provided: [`RelayBackend`] posts `{"input": ...}` to an HTTP
//! relay that answers `{"message": ...}`, and [`OpenAiBackend`] talks to a chat
//! completions endpoint directly with the same marketing prompt the relay uses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::types::Item;

/// Returned in place of a tweet when generation fails.
pub const FALLBACK_TEXT: &str = "Error generating tweet";

/// Returned by [`OpenAiBackend`] for empty input, without calling the API.
pub const NO_INPUT_TEXT: &str = "No input provided";

/// Returned by [`OpenAiBackend`] when the completion has no content.
pub const NO_RESPONSE_TEXT: &str = "No response from AI";

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

const SYSTEM_PROMPT: &str =
    "You are a marketing agent assistant that generated tweets from github commit messages.";
const MAX_TOKENS: u32 = 150;

/// Build the generation input for an item. The layout is fixed.
pub fn build_prompt(item: &Item) -> String {
    format!(
        "Title: {}\nBody: {}\nURL: {}",
        item.title, item.body, item.key
    )
}

/// Prompt in, text out.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn complete(&self, input: &str) -> Result<String, GenerationError>;
}

/// Generates tweets, never failing. Cheap to clone.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn TextBackend>,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, item: &Item) -> String {
        let prompt = build_prompt(item);
        match self.backend.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(key = %item.key, "Generated tweet");
                text
            }
            Ok(_) => {
                warn!(key = %item.key, "Generation backend returned empty text");
                FALLBACK_TEXT.to_string()
            }
            Err(e) => {
                warn!(key = %item.key, error = %e, "Tweet generation failed");
                FALLBACK_TEXT.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    message: Option<String>,
}

/// Posts prompts to an HTTP relay.
#[derive(Debug, Clone)]
pub struct RelayBackend {
    client: reqwest::Client,
    url: String,
}

impl RelayBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TextBackend for RelayBackend {
    async fn complete(&self, input: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&RelayRequest { input })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: RelayResponse = response.json().await?;
        body.message
            .filter(|m| !m.is_empty())
            .ok_or(GenerationError::EmptyResult)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Calls an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom endpoint (proxies, compatible servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn user_prompt(input: &str) -> String {
        format!("Generate a tweet for: {input}")
    }
}

#[async_trait]
impl TextBackend for OpenAiBackend {
    async fn complete(&self, input: &str) -> Result<String, GenerationError> {
        if input.is_empty() {
            return Ok(NO_INPUT_TEXT.to_string());
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::NotConfigured("OPENAI_API_KEY not set".into()))?;

        let user = Self::user_prompt(input);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()))
    }
}
