use serde::{Deserialize, Serialize};
use std::fmt;
use study_flows::{ChatMessage, FeynmanData, QuizData};

/// The single currently displayed result mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    Chat,
    Summary,
    Quiz,
    Feynman,
}

/// The five AI-backed operations a session can dispatch. Used for busy
/// guards and loading flags; adding a flow extends this enum and every
/// exhaustive match over it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FlowKind {
    Summarize,
    GenerateQuiz,
    AnswerQuestion,
    ExtractTopic,
    GradeExplanation,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summarize => "summarize",
            Self::GenerateQuiz => "generate-quiz",
            Self::AnswerQuestion => "answer-question",
            Self::ExtractTopic => "extract-topic",
            Self::GradeExplanation => "grade-explanation",
        };
        f.write_str(name)
    }
}

/// One loading flag per flow kind. A flag is set immediately before the
/// flow call is issued and cleared on every exit path.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadingFlags {
    pub summary: bool,
    pub quiz: bool,
    pub chat: bool,
    pub feynman: bool,
    pub feynman_grade: bool,
}

impl LoadingFlags {
    #[must_use]
    pub fn get(&self, kind: FlowKind) -> bool {
        match kind {
            FlowKind::Summarize => self.summary,
            FlowKind::GenerateQuiz => self.quiz,
            FlowKind::AnswerQuestion => self.chat,
            FlowKind::ExtractTopic => self.feynman,
            FlowKind::GradeExplanation => self.feynman_grade,
        }
    }

    pub fn set(&mut self, kind: FlowKind, value: bool) {
        match kind {
            FlowKind::Summarize => self.summary = value,
            FlowKind::GenerateQuiz => self.quiz = value,
            FlowKind::AnswerQuestion => self.chat = value,
            FlowKind::ExtractTopic => self.feynman = value,
            FlowKind::GradeExplanation => self.feynman_grade = value,
        }
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.summary || self.quiz || self.chat || self.feynman || self.feynman_grade
    }
}

/// What the presentation layer needs to render the active view: the view's
/// data plus the loading flags that gate its controls. Produced by an
/// exhaustive match over [`ActiveView`], so a new view is a compile-time
/// extension.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Chat {
        history: Vec<ChatMessage>,
        loading: bool,
    },
    Summary {
        summary: Option<String>,
        loading: bool,
    },
    Quiz {
        quiz: Option<QuizData>,
        loading: bool,
    },
    Feynman {
        data: Option<FeynmanData>,
        loading: bool,
        grading: bool,
    },
}
