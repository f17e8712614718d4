//! Core types for urlsum

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Loaded content with loader-specific metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text
    pub text: String,

    /// Loader-specific metadata (`source`, `title`, `author`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Document {
    /// Create a document with no metadata
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get a metadata entry as a string, if it is one
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Result of one summarization request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    /// The summarized URL
    pub url: String,

    /// Name of the loader that fetched the content ("youtube" or "web")
    pub loader: String,

    /// Model output, verbatim
    pub summary: String,

    /// Metadata of the first loaded document
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Summary {
    /// Get a metadata entry as a string, if it is one
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}
