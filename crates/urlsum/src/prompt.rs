//! Prompt templates with `{name}` placeholders

use crate::error::SummarizeError;
use std::collections::BTreeSet;

/// Default summarization prompt
pub const DEFAULT_SUMMARY_PROMPT: &str = "
Provide a summary of the following content in 300 words:
Content: {text}
";

/// Variable the stuff chain fills with document text
pub const TEXT_VARIABLE: &str = "text";

/// One parsed piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A fixed string with named placeholders
///
/// Placeholders are written `{name}`. Use `{{` and `}}` for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
    segments: Vec<Segment>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::summary()
    }
}

impl PromptTemplate {
    /// Parse a template and check its placeholders against the declared
    /// input variables
    pub fn new(
        template: impl Into<String>,
        input_variables: &[&str],
    ) -> Result<Self, SummarizeError> {
        let template = template.into();
        let segments = parse(&template)?;

        let found: BTreeSet<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Variable(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect();
        let declared: BTreeSet<&str> = input_variables.iter().copied().collect();

        if found != declared {
            return Err(SummarizeError::PromptError(format!(
                "template placeholders {:?} do not match input variables {:?}",
                found, declared
            )));
        }

        Ok(Self {
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
            template,
            segments,
        })
    }

    /// The built-in summarization prompt
    pub fn summary() -> Self {
        Self {
            template: DEFAULT_SUMMARY_PROMPT.to_string(),
            input_variables: vec![TEXT_VARIABLE.to_string()],
            segments: vec![
                Segment::Literal(
                    "\nProvide a summary of the following content in 300 words:\nContent: "
                        .to_string(),
                ),
                Segment::Variable(TEXT_VARIABLE.to_string()),
                Segment::Literal("\n".to_string()),
            ],
        }
    }

    /// The raw template string
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared input variables
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitute values for every placeholder
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String, SummarizeError> {
        let mut output = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| *key == name.as_str())
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            SummarizeError::PromptError(format!("missing variable '{}'", name))
                        })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

/// Split a template into literal text and placeholders
fn parse(template: &str) -> Result<Vec<Segment>, SummarizeError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) if ch.is_alphanumeric() || ch == '_' => name.push(ch),
                        _ => {
                            return Err(SummarizeError::PromptError(format!(
                                "malformed placeholder starting with '{{{}'",
                                name
                            )))
                        }
                    }
                }
                if name.is_empty() {
                    return Err(SummarizeError::PromptError(
                        "empty placeholder '{}'".to_string(),
                    ));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                return Err(SummarizeError::PromptError(
                    "single '}' encountered in template".to_string(),
                ))
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
