//! Generic web page loader
//!
//! Handles any URL not matched by a specialized loader: fetches the page
//! with a desktop browser User-Agent and extracts its visible text.

use crate::convert::{html_title, html_to_text, is_html};
use crate::error::SummarizeError;
use crate::loaders::{LoadOptions, Loader};
use crate::types::Document;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Generic web page loader
///
/// Produces a single document whose text is the page's visible text and
/// whose metadata holds the `source` URL (and `title` for HTML pages).
pub struct WebPageLoader;

impl WebPageLoader {
    /// Create a new web page loader
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebPageLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the HTTP client for page fetches
fn build_client(options: &LoadOptions) -> Result<reqwest::Client, SummarizeError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&options.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html, application/xhtml+xml, text/plain, */*;q=0.8"),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT.min(options.timeout))
        .read_timeout(options.timeout)
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .build()
        .map_err(SummarizeError::ClientBuildError)
}

#[async_trait]
impl Loader for WebPageLoader {
    fn name(&self) -> &'static str {
        "web"
    }

    fn matches(&self, _url: &Url) -> bool {
        // Fallback loader matches all URLs
        true
    }

    async fn load(
        &self,
        url: &Url,
        options: &LoadOptions,
    ) -> Result<Vec<Document>, SummarizeError> {
        if options.accept_invalid_certs {
            warn!(url = %url, "TLS certificate verification is disabled for this fetch");
        }

        let client = build_client(options)?;

        let response = client
            .get(url.as_str())
            .send()
            .await
            .map_err(SummarizeError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ct) = content_type.as_deref() {
            if is_binary_content_type(ct) {
                return Err(SummarizeError::BinaryContent(ct.to_string()));
            }
        }

        let body = read_body_with_timeout(response, options.timeout).await?;
        let raw = String::from_utf8_lossy(&body);
        debug!(url = %url, bytes = body.len(), "Fetched page");

        let document = if is_html(content_type.as_deref(), &raw) {
            let document = Document::new(html_to_text(&raw));
            match html_title(&raw) {
                Some(title) => document.with_metadata("title", title),
                None => document,
            }
        } else {
            Document::new(raw.trim())
        };

        if document.text.trim().is_empty() {
            return Err(SummarizeError::NoContent);
        }

        Ok(vec![document.with_metadata("source", url.as_str())])
    }
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Read the whole response body, failing if it takes longer than `timeout`
async fn read_body_with_timeout(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<Bytes, SummarizeError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => body.extend_from_slice(&bytes),
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        return Err(SummarizeError::from_reqwest(e));
                    }
                    None => return Ok(Bytes::from(body)),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                warn!(bytes = body.len(), "Body timeout reached");
                return Err(SummarizeError::Timeout);
            }
        }
    }
}
