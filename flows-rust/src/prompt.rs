//! Prompt templates for the five flows.
//!
//! Each flow has one fixed instructional template; rendering is a pure
//! function from typed input to instruction text. Conditional sections
//! (previous quiz questions, prior chat turns) are appended here and nowhere
//! else. The document itself is never inlined: it travels alongside the text
//! in [`RenderedPrompt`](crate::backend::RenderedPrompt) and is resolved by
//! the backend.

use crate::types::{ChatMessage, ChatRole, QuizQuestion};
use std::fmt::Write as _;

const SUMMARIZE_TEMPLATE: &str = "\
You are an AI assistant that specializes in summarizing lecture notes.

Given a PDF document of lecture notes, create a concise, bullet-point summary of the key concepts.

Use the attached lecture notes to generate the summary.";

const QUIZ_TEMPLATE: &str = "\
You are an expert at creating multiple-choice quizzes from lecture notes.

Create a 5-question multiple-choice quiz based on the content of the attached PDF document.

The quiz should test the user's understanding of the key concepts and ideas presented in the document.

The quiz should have 5 questions, each with 4 possible answers. One of the answers should be the correct answer.";

const ANSWER_TEMPLATE: &str = "\
You are an AI assistant that answers questions about lecture notes.

Answer the user's question using only the content of the attached PDF document. If the document does not contain the answer, say so instead of guessing.";

const TOPIC_TEMPLATE: &str = "\
You are an AI assistant that helps students study.

Extract a single, specific, and important topic or concept from the attached document.
The topic should be suitable for a student to explain as part of the Feynman technique.

Provide only the name of the topic. For example: \"Polymorphism\" or \"The Krebs Cycle\".";

const GRADE_TEMPLATE: &str = "\
You are a strict but fair university professor who is an expert in the Feynman Technique. Your goal is to assess a student's understanding of a topic by evaluating how simply and accurately they can explain it.

A student was given the following topic to explain, based on the attached lecture notes:
Topic: {topic}

Here is the student's explanation:
\"{explanation}\"

Your task is to grade the student's explanation.
1. Rate their explanation on a scale of 0 to 10, where 0 is completely wrong and 10 is a perfect, simple, and accurate explanation.
2. Provide detailed, constructive feedback. Start with what they got right. Then, gently point out any inaccuracies. Finally, and most importantly, explain what key concepts or details from the notes are missing from their explanation.
3. Keep your feedback concise and easy to understand. The goal is to help them learn, not to discourage them.";

#[must_use]
pub fn render_summarize() -> String {
    SUMMARIZE_TEMPLATE.to_string()
}

/// Render the quiz prompt. When `previous_questions` is non-empty the model
/// is instructed to produce a fresh set, enumerating each prior question by
/// its text. Advisory only: novelty is never enforced programmatically.
#[must_use]
pub fn render_quiz(previous_questions: &[QuizQuestion]) -> String {
    let mut prompt = QUIZ_TEMPLATE.to_string();
    if !previous_questions.is_empty() {
        prompt.push_str(
            "\n\nPlease generate a NEW set of questions that are different from the following questions:",
        );
        for question in previous_questions {
            let _ = write!(prompt, "\n- Question: {}", question.question);
        }
    }
    prompt
}

/// Render the Q&A prompt. Prior turns, if any, are replayed as a transcript
/// so follow-up questions can refer back to them.
#[must_use]
pub fn render_answer(question: &str, history: &[ChatMessage]) -> String {
    let mut prompt = ANSWER_TEMPLATE.to_string();
    if !history.is_empty() {
        prompt.push_str("\n\nConversation so far:");
        for message in history {
            let speaker = match message.role {
                ChatRole::User => "Student",
                ChatRole::Ai => "Assistant",
            };
            let _ = write!(prompt, "\n{speaker}: {}", message.content);
        }
    }
    let _ = write!(prompt, "\n\nQuestion: {question}");
    prompt
}

#[must_use]
pub fn render_topic() -> String {
    TOPIC_TEMPLATE.to_string()
}

#[must_use]
pub fn render_grade(topic: &str, explanation: &str) -> String {
    GRADE_TEMPLATE
        .replace("{topic}", topic)
        .replace("{explanation}", explanation)
}
