use super::validate_document;
use crate::{
    backend::{GenerativeBackend, RenderedPrompt},
    client::{invoke, FlowOutput},
    errors::FlowResult,
    prompt,
    types::{Document, JSONSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A single, specific topic suitable for a teach-it-back exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicOutput {
    pub topic: String,
}

impl FlowOutput for TopicOutput {
    const SCHEMA_NAME: &'static str = "topic";

    fn schema() -> JSONSchema {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "A single, specific, and important topic or concept from the document."
                }
            },
            "required": ["topic"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.topic.trim().is_empty() {
            return Err("topic is empty".to_string());
        }
        Ok(())
    }
}

pub async fn extract_topic(
    backend: &dyn GenerativeBackend,
    document: Document,
) -> FlowResult<TopicOutput> {
    validate_document(&document)?;
    invoke(
        backend,
        RenderedPrompt {
            instructions: prompt::render_topic(),
            document,
        },
    )
    .await
}
