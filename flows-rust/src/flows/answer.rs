use super::validate_document;
use crate::{
    backend::{GenerativeBackend, RenderedPrompt},
    client::{invoke, FlowOutput},
    errors::{FlowError, FlowResult},
    prompt,
    types::{ChatMessage, Document, JSONSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Input for the Q&A flow: the document, the user's question, and the prior
/// turns of the conversation (may be empty).
#[derive(Debug, Clone)]
pub struct AnswerInput {
    pub document: Document,
    pub question: String,
    pub history: Vec<ChatMessage>,
}

/// A single answer grounded in the document content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerOutput {
    pub answer: String,
}

impl FlowOutput for AnswerOutput {
    const SCHEMA_NAME: &'static str = "answer";

    fn schema() -> JSONSchema {
        json!({
            "type": "object",
            "properties": {
                "answer": {
                    "type": "string",
                    "description": "The answer to the question, based only on the document content."
                }
            },
            "required": ["answer"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.answer.trim().is_empty() {
            return Err("answer is empty".to_string());
        }
        Ok(())
    }
}

pub async fn answer_question(
    backend: &dyn GenerativeBackend,
    input: AnswerInput,
) -> FlowResult<AnswerOutput> {
    validate_document(&input.document)?;
    if input.question.trim().is_empty() {
        return Err(FlowError::Validation("question is empty".to_string()));
    }
    invoke(
        backend,
        RenderedPrompt {
            instructions: prompt::render_answer(&input.question, &input.history),
            document: input.document,
        },
    )
    .await
}
