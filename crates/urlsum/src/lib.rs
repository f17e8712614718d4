//! urlsum - summarize YouTube videos and web pages with a hosted LLM
//!
//! A request takes a Groq API key and a URL. The URL is routed to a loader,
//! the loaded text is stuffed into a single summarization prompt, and the
//! model's reply is returned as a [`Summary`].
//!
//! ## Loader System
//!
//! Loaders handle specific URL patterns. The [`LoaderRegistry`] dispatches
//! requests to the first loader whose `matches()` accepts the URL.
//!
//! Built-in loaders:
//! - [`YoutubeLoader`] - video transcript plus video info
//! - [`WebPageLoader`] - any other page, HTML converted to text
//!
//! ## Example
//!
//! ```no_run
//! use urlsum::{summarize, Session, SummarizerConfig};
//!
//! # async fn run() -> Result<(), urlsum::SummarizeError> {
//! let session = Session::new("gsk_...", "https://example.com/article");
//! let summary = summarize(&session, &SummarizerConfig::default()).await?;
//! println!("{}", summary.summary);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod client;
mod convert;
mod error;
pub mod input;
pub mod llm;
pub mod loaders;
pub mod prompt;
mod types;

pub use chain::StuffChain;
pub use client::{summarize, summarize_with, SummarizerBuilder, SummarizerConfig};
pub use convert::{html_title, html_to_text};
pub use error::SummarizeError;
pub use input::{validate_api_key, validate_url, Session};
pub use llm::{ChatModel, GroqChat, ModelConfig};
pub use loaders::{
    extract_video_id, LoadOptions, Loader, LoaderRegistry, WebPageLoader, YoutubeLoader,
};
pub use prompt::PromptTemplate;
pub use types::{Document, Summary};

/// Default User-Agent string, a desktop Chrome build
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";
