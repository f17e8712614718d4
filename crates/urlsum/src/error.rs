//! Error types for urlsum

use thiserror::Error;

/// Errors that can occur while validating input, loading content or
/// summarizing it
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// API key is missing or blank
    #[error("Please enter a valid Groq API Key.")]
    MissingApiKey,

    /// URL is missing or blank
    #[error("Please provide the information to get started")]
    MissingUrl,

    /// URL failed syntax validation
    #[error("Please enter a valid URL. It can be a YouTube video URL or website URL")]
    InvalidUrl,

    /// URL was routed to the YouTube loader but carries no video id
    #[error("Could not determine the video ID for the URL")]
    VideoIdNotFound,

    /// Video has no usable transcript
    #[error("No transcript available for video {0}")]
    TranscriptUnavailable(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Content type is not textual
    #[error("Binary content is not supported: {0}")]
    BinaryContent(String),

    /// Loader-specific error
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Nothing to summarize
    #[error("No content could be extracted from the URL")]
    NoContent,

    /// Prompt template is malformed or was given the wrong variables
    #[error("Prompt error: {0}")]
    PromptError(String),

    /// Chat completion API failed
    #[error("Model error: {0}")]
    ModelError(String),
}

impl SummarizeError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SummarizeError::Timeout
        } else if err.is_connect() {
            SummarizeError::ConnectError(err)
        } else {
            SummarizeError::RequestError(err.to_string())
        }
    }

    /// True for problems with the operator's input (API key or URL).
    ///
    /// These are reported inline. Every other error comes from fetching or
    /// summarizing and is displayed as an exception.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SummarizeError::MissingApiKey | SummarizeError::MissingUrl | SummarizeError::InvalidUrl
        )
    }
}
