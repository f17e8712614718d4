//! Summarization pipeline
//!
//! This module provides the main entry points: validate the session, build
//! the model client, load the URL and run the stuff chain. Loading is
//! delegated to loaders in the [`loaders`](crate::loaders) module.

use crate::chain::StuffChain;
use crate::error::SummarizeError;
use crate::input::{validate_api_key, validate_url, Session};
use crate::llm::{ChatModel, GroqChat, ModelConfig};
use crate::loaders::{LoadOptions, LoaderRegistry};
use crate::prompt::PromptTemplate;
use crate::types::Summary;
use std::time::Duration;
use tracing::info;

/// Everything a summarization request needs besides the session
#[derive(Debug, Clone, Default)]
pub struct SummarizerConfig {
    /// Chat completion endpoint
    pub model: ModelConfig,
    /// Loader options
    pub load: LoadOptions,
    /// Prompt with a `text` variable
    pub prompt: PromptTemplate,
}

impl SummarizerConfig {
    /// Create a config builder
    pub fn builder() -> SummarizerBuilder {
        SummarizerBuilder::new()
    }
}

/// Builder for [`SummarizerConfig`]
#[derive(Debug, Clone, Default)]
pub struct SummarizerBuilder {
    config: SummarizerConfig,
}

impl SummarizerBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model.model = model.into();
        self
    }

    /// Set the chat completion API root
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.model.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.model.temperature = temperature;
        self
    }

    /// Set the model request timeout
    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.config.model.timeout = timeout;
        self
    }

    /// Set the User-Agent for content requests
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.load.user_agent = ua.into();
        self
    }

    /// Skip (true) or enforce (false) TLS certificate verification for
    /// generic page fetches
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.load.accept_invalid_certs = accept;
        self
    }

    /// Set preferred transcript languages
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.load.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the content request timeout
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.config.load.timeout = timeout;
        self
    }

    /// Set the prompt template
    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.config.prompt = prompt;
        self
    }

    /// Build the config
    pub fn build(self) -> SummarizerConfig {
        self.config
    }
}

/// Summarize the session's URL with the built-in loaders and Groq
pub async fn summarize(
    session: &Session,
    config: &SummarizerConfig,
) -> Result<Summary, SummarizeError> {
    let registry = LoaderRegistry::with_defaults();
    summarize_with(session, config, &registry, |api_key, model_config| {
        GroqChat::new(api_key, model_config.clone())
    })
    .await
}

/// Summarize with a custom loader registry and model factory
///
/// Checks run in order and stop at the first failure:
/// 1. API key present; otherwise the model factory is never called
/// 2. model client construction
/// 3. URL present and valid; otherwise no loader runs
/// 4. loading
/// 5. one model call over all loaded text
pub async fn summarize_with<M, F>(
    session: &Session,
    config: &SummarizerConfig,
    registry: &LoaderRegistry,
    make_model: F,
) -> Result<Summary, SummarizeError>
where
    M: ChatModel,
    F: FnOnce(&str, &ModelConfig) -> Result<M, SummarizeError>,
{
    let api_key = validate_api_key(&session.api_key)?;
    let model = make_model(api_key, &config.model)?;

    let url = validate_url(&session.url)?;

    let (loader, documents) = registry.load(&url, &config.load).await?;
    info!(loader, documents = documents.len(), url = %url, "Loaded content");

    let summary = StuffChain::new(&model, &config.prompt)
        .run(&documents)
        .await?;
    info!(
        provider = model.name(),
        model = model.model(),
        chars = summary.len(),
        "Summary ready"
    );

    Ok(Summary {
        url: url.to_string(),
        loader: loader.to_string(),
        summary,
        metadata: documents
            .into_iter()
            .next()
            .map(|doc| doc.metadata)
            .unwrap_or_default(),
    })
}
