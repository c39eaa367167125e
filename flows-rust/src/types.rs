use crate::errors::{FlowError, FlowResult};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a JSON schema.
pub type JSONSchema = Value;

/// The uploaded document shared by every flow in a session. Stored as a
/// base64 payload with its MIME type so it can travel as a self-describing
/// data URI. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// The original file name, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The MIME type of the payload. E.g. "application/pdf".
    pub mime_type: String,
    /// The base64-encoded payload.
    pub data: String,
}

impl Document {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            name: None,
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Parse a `data:<mimetype>;base64,<encoded_data>` URI as produced by
    /// the upload boundary.
    pub fn from_data_uri(uri: &str) -> FlowResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| FlowError::Validation("document is not a data URI".to_string()))?;
        let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
            FlowError::Validation("document data URI must declare base64 encoding".to_string())
        })?;
        if mime_type.is_empty() || data.is_empty() {
            return Err(FlowError::Validation(
                "document data URI is missing a MIME type or payload".to_string(),
            ));
        }
        Ok(Self {
            name: None,
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// The text of the question.
    pub question: String,
    /// The possible answers, exactly four of them.
    pub options: Vec<String>,
    /// The correct answer. Must equal one of `options`.
    pub correct_answer: String,
}

/// A quiz of exactly five questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizData {
    pub questions: Vec<QuizQuestion>,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

/// One turn in the document Q&A transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

/// The grade assigned to a teach-it-back explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeynmanGrade {
    /// A score from 0 to 10.
    pub score: f64,
    /// Constructive feedback covering what was right, what was wrong, and
    /// what was missing.
    pub feedback: String,
}

/// The state of one teach-it-back exercise: the topic the student was asked
/// to explain and, once graded, the grade. A new topic replaces this value
/// wholesale, dropping any prior grade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeynmanData {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<FeynmanGrade>,
}
