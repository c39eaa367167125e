use super::validate_document;
use crate::{
    backend::{GenerativeBackend, RenderedPrompt},
    client::{invoke, FlowOutput},
    errors::FlowResult,
    prompt,
    retry::RetryPolicy,
    types::{Document, JSONSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Input for the summarization flow: the lecture notes and nothing else.
#[derive(Debug, Clone)]
pub struct SummarizeInput {
    pub document: Document,
}

/// A concise, bullet-point summary of the lecture notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummarizeOutput {
    pub summary: String,
}

impl FlowOutput for SummarizeOutput {
    const SCHEMA_NAME: &'static str = "summary";

    fn schema() -> JSONSchema {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "A concise, bullet-point summary of the lecture notes."
                }
            },
            "required": ["summary"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.summary.trim().is_empty() {
            return Err("summary is empty".to_string());
        }
        Ok(())
    }
}

/// Summarize the document. Runs through the retry policy: this flow is one
/// of the two observed to hit provider rate limits in practice.
pub async fn summarize(
    backend: &dyn GenerativeBackend,
    retry: &RetryPolicy,
    input: SummarizeInput,
) -> FlowResult<SummarizeOutput> {
    validate_document(&input.document)?;
    retry
        .run(|| {
            invoke(
                backend,
                RenderedPrompt {
                    instructions: prompt::render_summarize(),
                    document: input.document.clone(),
                },
            )
        })
        .await
}
