use super::validate_document;
use crate::{
    backend::{GenerativeBackend, RenderedPrompt},
    client::{invoke, FlowOutput},
    errors::{FlowError, FlowResult},
    prompt,
    types::{Document, FeynmanGrade, JSONSchema},
};
use serde_json::json;

/// Input for the explanation-grading flow: the document the topic came
/// from, the topic itself, and the student's explanation of it.
#[derive(Debug, Clone)]
pub struct GradeInput {
    pub document: Document,
    pub topic: String,
    pub explanation: String,
}

impl FlowOutput for FeynmanGrade {
    const SCHEMA_NAME: &'static str = "grade";

    fn schema() -> JSONSchema {
        json!({
            "type": "object",
            "properties": {
                "score": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 10,
                    "description": "A score from 0 to 10 for the explanation."
                },
                "feedback": {
                    "type": "string",
                    "description": "Detailed, constructive feedback on the explanation, pointing out what was right, what was wrong, and what was missing."
                }
            },
            "required": ["score", "feedback"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=10.0).contains(&self.score) {
            return Err(format!("score {} is outside 0..=10", self.score));
        }
        if self.feedback.trim().is_empty() {
            return Err("feedback is empty".to_string());
        }
        Ok(())
    }
}

pub async fn grade_explanation(
    backend: &dyn GenerativeBackend,
    input: GradeInput,
) -> FlowResult<FeynmanGrade> {
    validate_document(&input.document)?;
    if input.topic.trim().is_empty() {
        return Err(FlowError::Validation("topic is empty".to_string()));
    }
    if input.explanation.trim().is_empty() {
        return Err(FlowError::Validation("explanation is empty".to_string()));
    }
    invoke(
        backend,
        RenderedPrompt {
            instructions: prompt::render_grade(&input.topic, &input.explanation),
            document: input.document,
        },
    )
    .await
}
