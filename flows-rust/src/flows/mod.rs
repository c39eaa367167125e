//! The five AI-backed operations. Each flow is the same pipeline: validate
//! input, render the prompt, invoke the backend (through the retry policy
//! for the two rate-limit-prone flows), return the validated output.

mod answer;
mod grade;
mod quiz;
mod summarize;
mod topic;

pub use answer::{answer_question, AnswerInput, AnswerOutput};
pub use grade::{grade_explanation, GradeInput};
pub use quiz::{generate_quiz, QuizInput};
pub use summarize::{summarize, SummarizeInput, SummarizeOutput};
pub use topic::{extract_topic, TopicOutput};

use crate::{
    errors::{FlowError, FlowResult},
    types::Document,
};

pub(crate) fn validate_document(document: &Document) -> FlowResult<()> {
    if document.is_empty() {
        return Err(FlowError::Validation(
            "document payload is empty".to_string(),
        ));
    }
    if document.mime_type.is_empty() {
        return Err(FlowError::Validation(
            "document is missing a MIME type".to_string(),
        ));
    }
    Ok(())
}
