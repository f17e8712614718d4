//! Chat completion clients
//!
//! [`ChatModel`] is the seam between the summarization chain and a hosted
//! model. [`GroqChat`] talks to any OpenAI-compatible `chat/completions`
//! endpoint, Groq by default.

use crate::error::SummarizeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default API root
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemma-7b-it";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default timeout for one completion
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Trait for chat completion models
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name (for logging)
    fn name(&self) -> &'static str;

    /// Model identifier sent to the provider
    fn model(&self) -> &str;

    /// Send the prompt as a single user message and return the reply text
    async fn complete(&self, prompt: &str) -> Result<String, SummarizeError>;
}

/// Model endpoint configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// API root; `/chat/completions` is appended
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
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
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Groq (OpenAI-compatible) chat client
#[derive(Clone)]
pub struct GroqChat {
    client: reqwest::Client,
    api_key: String,
    config: ModelConfig,
}

impl fmt::Debug for GroqChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqChat")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl GroqChat {
    /// Create a client for the given key and endpoint configuration
    pub fn new(api_key: impl Into<String>, mut config: ModelConfig) -> Result<Self, SummarizeError> {
        while config.base_url.ends_with('/') {
            config.base_url.pop();
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SummarizeError::ClientBuildError)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Endpoint configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl ChatModel for GroqChat {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, SummarizeError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            stream: false,
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "Sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(SummarizeError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(SummarizeError::from_reqwest)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(SummarizeError::ModelError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| SummarizeError::ModelError(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SummarizeError::ModelError("Response contained no choices".to_string()))
    }
}
