//! Loader system for fetching summarizable content
//!
//! Design: Each loader handles specific URL patterns with custom logic.
//! LoaderRegistry dispatches to the first matching loader.

mod web;
mod youtube;

pub use web::WebPageLoader;
pub use youtube::{extract_video_id, YoutubeLoader};

use crate::error::SummarizeError;
use crate::types::Document;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Default timeout for a single content request
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Options shared by all loaders
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Skip TLS certificate verification for generic page fetches
    pub accept_invalid_certs: bool,
    /// Preferred transcript languages, in order
    pub languages: Vec<String>,
    /// Timeout for each HTTP request
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: true,
            languages: vec!["en".to_string()],
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

/// Trait for content loaders
///
/// Each loader declares what URLs it can handle via `matches()` and
/// produces documents via `load()`.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Unique identifier for this loader (for logging and output)
    fn name(&self) -> &'static str;

    /// Returns true if this loader should handle the given URL
    ///
    /// More specific loaders should be registered before generic ones.
    fn matches(&self, url: &Url) -> bool;

    /// Load documents from the URL
    ///
    /// Called only if `matches()` returned true. Any failure aborts the
    /// request; partial results are never returned.
    async fn load(&self, url: &Url, options: &LoadOptions)
        -> Result<Vec<Document>, SummarizeError>;
}

/// Registry of loaders that dispatches to the appropriate one
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn Loader>>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Create a registry with the built-in loaders
    ///
    /// Includes (in order of priority):
    /// 1. YoutubeLoader - URLs mentioning youtube.com
    /// 2. WebPageLoader - everything else
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(YoutubeLoader::new()));
        registry.register(Box::new(WebPageLoader::new()));
        registry
    }

    /// Register a loader
    ///
    /// Loaders are checked in registration order.
    pub fn register(&mut self, loader: Box<dyn Loader>) {
        self.loaders.push(loader);
    }

    /// Pick the loader for a URL without running it
    pub fn select(&self, url: &Url) -> Option<&dyn Loader> {
        self.loaders
            .iter()
            .find(|loader| loader.matches(url))
            .map(|loader| loader.as_ref())
    }

    /// Load a URL using the first matching loader
    ///
    /// Returns the loader's name with its documents.
    pub async fn load(
        &self,
        url: &Url,
        options: &LoadOptions,
    ) -> Result<(&'static str, Vec<Document>), SummarizeError> {
        let loader = self.select(url).ok_or_else(|| {
            SummarizeError::LoaderError("No loader available for URL".to_string())
        })?;

        tracing::info!(loader = loader.name(), url = %url, "Using loader");
        let documents = loader.load(url, options).await?;
        Ok((loader.name(), documents))
    }
}
