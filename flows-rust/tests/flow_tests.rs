use serde_json::{json, Value};
use study_flows::{
    answer_question, extract_topic, generate_quiz, grade_explanation,
    study_flows_test::{MockBackend, MockGenerateResult},
    summarize, AnswerInput, ChatMessage, Document, FlowError, GradeInput, QuizInput, RetryPolicy,
    SummarizeInput,
};

fn document() -> Document {
    Document::from_bytes("application/pdf", b"%PDF-1.4 lecture notes")
}

fn rate_limited(retry_after: Option<f64>) -> FlowError {
    FlowError::RateLimited {
        status: 429,
        retry_after,
        message: "quota exceeded".to_string(),
    }
}

fn quiz_value() -> Value {
    let questions: Vec<Value> = (0..5)
        .map(|i| {
            json!({
                "question": format!("Question {i}?"),
                "options": ["a", "b", "c", "d"],
                "correctAnswer": "b"
            })
        })
        .collect();
    json!({ "questions": questions })
}

#[tokio::test]
async fn summarize_returns_validated_summary() {
    let backend = MockBackend::new();
    backend.enqueue(json!({ "summary": "- point one\n- point two" }));

    let output = summarize(
        &backend,
        &RetryPolicy::default(),
        SummarizeInput {
            document: document(),
        },
    )
    .await
    .unwrap();

    assert_eq!(output.summary, "- point one\n- point two");
    let requests = backend.tracked_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].schema_name, "summary");
    assert_eq!(requests[0].prompt.document.mime_type, "application/pdf");
}

#[tokio::test]
async fn empty_document_is_rejected_before_any_call() {
    let backend = MockBackend::new();
    let err = summarize(
        &backend,
        &RetryPolicy::default(),
        SummarizeInput {
            document: Document::from_bytes("application/pdf", b""),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn quiz_result_satisfies_shape_invariants() {
    let backend = MockBackend::new();
    backend.enqueue(quiz_value());

    let quiz = generate_quiz(
        &backend,
        &RetryPolicy::default(),
        QuizInput {
            document: document(),
            previous_questions: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(quiz.questions.len(), 5);
    for question in &quiz.questions {
        assert_eq!(question.options.len(), 4);
        assert!(question.options.contains(&question.correct_answer));
    }
}

#[tokio::test]
async fn quiz_with_wrong_question_count_is_a_schema_mismatch() {
    let backend = MockBackend::new();
    backend.enqueue(json!({
        "questions": [{
            "question": "Only one?",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "a"
        }]
    }));

    let err = generate_quiz(
        &backend,
        &RetryPolicy::default(),
        QuizInput {
            document: document(),
            previous_questions: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::SchemaMismatch(_)));
}

#[tokio::test]
async fn quiz_with_stray_correct_answer_is_a_schema_mismatch() {
    let mut value = quiz_value();
    value["questions"][2]["correctAnswer"] = json!("not an option");
    let backend = MockBackend::new();
    backend.enqueue(value);

    let err = generate_quiz(
        &backend,
        &RetryPolicy::default(),
        QuizInput {
            document: document(),
            previous_questions: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::SchemaMismatch(_)));
}

#[tokio::test]
async fn quiz_regeneration_enumerates_previous_questions_in_prompt() {
    let backend = MockBackend::new();
    backend.enqueue(quiz_value());
    backend.enqueue(quiz_value());

    let retry = RetryPolicy::default();
    let first = generate_quiz(
        &backend,
        &retry,
        QuizInput {
            document: document(),
            previous_questions: None,
        },
    )
    .await
    .unwrap();

    let second = generate_quiz(
        &backend,
        &retry,
        QuizInput {
            document: document(),
            previous_questions: Some(first.questions.clone()),
        },
    )
    .await
    .unwrap();

    assert_eq!(second.questions.len(), 5);
    let requests = backend.tracked_requests();
    assert!(!requests[0].prompt.instructions.contains("NEW set"));
    let regen = &requests[1].prompt.instructions;
    assert!(regen.contains("NEW set of questions"));
    for question in &first.questions {
        assert!(regen.contains(&format!("- Question: {}", question.question)));
    }
}

#[tokio::test(start_paused = true)]
async fn rate_limits_are_retried_until_success() {
    let backend = MockBackend::new();
    backend.enqueue_all([
        MockGenerateResult::error(rate_limited(Some(2.0))),
        MockGenerateResult::error(rate_limited(None)),
        MockGenerateResult::value(json!({ "summary": "- recovered" })),
    ]);

    let output = summarize(
        &backend,
        &RetryPolicy::default(),
        SummarizeInput {
            document: document(),
        },
    )
    .await
    .unwrap();

    assert_eq!(output.summary, "- recovered");
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_retries_are_capped_at_three() {
    let backend = MockBackend::new();
    backend.enqueue_all((0..4).map(|_| MockGenerateResult::error(rate_limited(None))));

    let err = summarize(
        &backend,
        &RetryPolicy::default(),
        SummarizeInput {
            document: document(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::RateLimited { .. }));
    // 1 initial attempt + 3 retries.
    assert_eq!(backend.call_count(), 4);
}

#[tokio::test]
async fn non_rate_limit_failures_are_never_retried() {
    let backend = MockBackend::new();
    backend.enqueue(MockGenerateResult::error(FlowError::Backend(
        "internal error".to_string(),
    )));

    let err = generate_quiz(
        &backend,
        &RetryPolicy::default(),
        QuizInput {
            document: document(),
            previous_questions: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::Backend(_)));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn answer_question_threads_history_into_the_prompt() {
    let backend = MockBackend::new();
    backend.enqueue(json!({ "answer": "RNA is single-stranded." }));

    let output = answer_question(
        &backend,
        AnswerInput {
            document: document(),
            question: "And RNA?".to_string(),
            history: vec![
                ChatMessage::user("What is DNA?"),
                ChatMessage::ai("DNA is double-stranded."),
            ],
        },
    )
    .await
    .unwrap();

    assert_eq!(output.answer, "RNA is single-stranded.");
    let requests = backend.tracked_requests();
    assert!(requests[0].prompt.instructions.contains("Student: What is DNA?"));
    assert!(requests[0].prompt.instructions.contains("Question: And RNA?"));
}

#[tokio::test]
async fn blank_question_is_rejected_before_any_call() {
    let backend = MockBackend::new();
    let err = answer_question(
        &backend,
        AnswerInput {
            document: document(),
            question: "   ".to_string(),
            history: vec![],
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn extract_topic_returns_a_topic() {
    let backend = MockBackend::new();
    backend.enqueue(json!({ "topic": "The Krebs Cycle" }));

    let output = extract_topic(&backend, document()).await.unwrap();
    assert_eq!(output.topic, "The Krebs Cycle");
    assert_eq!(backend.tracked_requests()[0].schema_name, "topic");
}

#[tokio::test]
async fn grade_outside_score_range_is_a_schema_mismatch() {
    let backend = MockBackend::new();
    backend.enqueue(json!({ "score": 11.0, "feedback": "too generous" }));

    let err = grade_explanation(
        &backend,
        GradeInput {
            document: document(),
            topic: "Osmosis".to_string(),
            explanation: "water moves".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FlowError::SchemaMismatch(_)));
}

#[tokio::test]
async fn grade_success_carries_score_and_feedback() {
    let backend = MockBackend::new();
    backend.enqueue(json!({ "score": 7, "feedback": "Good start; missing the role of ATP." }));

    let grade = grade_explanation(
        &backend,
        GradeInput {
            document: document(),
            topic: "Cellular respiration".to_string(),
            explanation: "cells burn sugar for energy".to_string(),
        },
    )
    .await
    .unwrap();

    assert!((grade.score - 7.0).abs() < f64::EPSILON);
    assert!(grade.feedback.contains("ATP"));
    let prompt = &backend.tracked_requests()[0].prompt.instructions;
    assert!(prompt.contains("Topic: Cellular respiration"));
}

#[tokio::test]
async fn malformed_response_is_a_schema_mismatch() {
    let backend = MockBackend::new();
    backend.enqueue(json!({ "unexpected": true }));

    let err = extract_topic(&backend, document()).await.unwrap_err();
    assert!(matches!(err, FlowError::SchemaMismatch(_)));
}
