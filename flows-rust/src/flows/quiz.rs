use super::validate_document;
use crate::{
    backend::{GenerativeBackend, RenderedPrompt},
    client::{invoke, FlowOutput},
    errors::FlowResult,
    prompt,
    retry::RetryPolicy,
    types::{Document, JSONSchema, QuizData, QuizQuestion},
};
use serde_json::json;

pub const QUIZ_QUESTION_COUNT: usize = 5;
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Input for the quiz flow. `previous_questions` is advisory context only:
/// it is enumerated in the prompt to request a fresh set, never enforced
/// against the result.
#[derive(Debug, Clone)]
pub struct QuizInput {
    pub document: Document,
    pub previous_questions: Option<Vec<QuizQuestion>>,
}

impl FlowOutput for QuizData {
    const SCHEMA_NAME: &'static str = "quiz";

    fn schema() -> JSONSchema {
        json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "description": "An array of 5 multiple-choice questions.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The text of the question."
                            },
                            "options": {
                                "type": "array",
                                "description": "An array of 4 possible answers.",
                                "items": { "type": "string" }
                            },
                            "correctAnswer": {
                                "type": "string",
                                "description": "The correct answer to the question. Must be one of the options."
                            }
                        },
                        "required": ["question", "options", "correctAnswer"]
                    }
                }
            },
            "required": ["questions"]
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.questions.len() != QUIZ_QUESTION_COUNT {
            return Err(format!(
                "expected {QUIZ_QUESTION_COUNT} questions, got {}",
                self.questions.len()
            ));
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.question.trim().is_empty() {
                return Err(format!("question {index} has no text"));
            }
            if question.options.len() != QUIZ_OPTION_COUNT {
                return Err(format!(
                    "question {index} has {} options, expected {QUIZ_OPTION_COUNT}",
                    question.options.len()
                ));
            }
            if !question.options.contains(&question.correct_answer) {
                return Err(format!(
                    "question {index}: correct answer is not one of the options"
                ));
            }
        }
        Ok(())
    }
}

/// Generate a five-question multiple-choice quiz from the document. Runs
/// through the retry policy: this flow is one of the two observed to hit
/// provider rate limits in practice.
pub async fn generate_quiz(
    backend: &dyn GenerativeBackend,
    retry: &RetryPolicy,
    input: QuizInput,
) -> FlowResult<QuizData> {
    validate_document(&input.document)?;
    let instructions = prompt::render_quiz(input.previous_questions.as_deref().unwrap_or(&[]));
    retry
        .run(|| {
            invoke(
                backend,
                RenderedPrompt {
                    instructions: instructions.clone(),
                    document: input.document.clone(),
                },
            )
        })
        .await
}
