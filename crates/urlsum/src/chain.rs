//! Single-pass "stuff" summarization chain

use crate::error::SummarizeError;
use crate::llm::ChatModel;
use crate::prompt::{PromptTemplate, TEXT_VARIABLE};
use crate::types::Document;
use tracing::debug;

/// Separator placed between documents
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Concatenates every document into one prompt and makes a single model call
pub struct StuffChain<'a> {
    model: &'a dyn ChatModel,
    prompt: &'a PromptTemplate,
}

impl<'a> StuffChain<'a> {
    /// Create a chain over a model and a prompt with a `text` variable
    pub fn new(model: &'a dyn ChatModel, prompt: &'a PromptTemplate) -> Self {
        Self { model, prompt }
    }

    /// Build the prompt that [`run`](Self::run) would submit
    pub fn build_prompt(&self, documents: &[Document]) -> Result<String, SummarizeError> {
        if documents.is_empty() {
            return Err(SummarizeError::NoContent);
        }

        let text = documents
            .iter()
            .map(|doc| doc.text.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);

        self.prompt.format(&[(TEXT_VARIABLE, text.as_str())])
    }

    /// Summarize the documents and return the model's reply verbatim
    pub async fn run(&self, documents: &[Document]) -> Result<String, SummarizeError> {
        let prompt = self.build_prompt(documents)?;
        debug!(
            provider = self.model.name(),
            model = self.model.model(),
            documents = documents.len(),
            prompt_chars = prompt.len(),
            "Running stuff chain"
        );
        self.model.complete(&prompt).await
    }
}
