use crate::{
    errors::SessionError,
    types::{ActiveView, FlowKind, LoadingFlags, ViewState},
};
use futures::lock::Mutex;
use std::sync::Arc;
use study_flows::{
    answer_question, extract_topic, generate_quiz, grade_explanation, summarize, AnswerInput,
    ChatMessage, Document, FeynmanData, GenerativeBackend, GradeInput, QuizData, QuizInput,
    QuizQuestion, RetryPolicy, SummarizeInput,
};
use tracing::{debug, warn};

/// Everything a session owns: the document, the derived results each flow
/// writes, and the per-flow loading flags. `generation` is bumped on every
/// document change so a flow that was dispatched against an older document
/// can recognize its result as stale and drop it.
#[derive(Debug)]
struct SessionState {
    document: Option<Document>,
    generation: u64,
    active_view: ActiveView,
    summary: Option<String>,
    quiz: Option<QuizData>,
    chat_history: Vec<ChatMessage>,
    feynman: Option<FeynmanData>,
    loading: LoadingFlags,
}

impl SessionState {
    fn new() -> Self {
        Self {
            document: None,
            generation: 0,
            active_view: ActiveView::Chat,
            summary: None,
            quiz: None,
            chat_history: Vec::new(),
            feynman: None,
            loading: LoadingFlags::default(),
        }
    }

    /// Drop everything derived from the current document, including any
    /// in-flight loading flags (their results will be dropped as stale).
    fn reset_derived(&mut self) {
        self.summary = None;
        self.quiz = None;
        self.chat_history.clear();
        self.feynman = None;
        self.loading = LoadingFlags::default();
    }

    /// Guarded entry into a flow: requires a document and rejects the
    /// request if a flow of the same kind is already in flight. On success
    /// the kind's loading flag is set and the document plus the current
    /// generation are returned for the dispatch.
    fn begin_flow(&mut self, kind: FlowKind) -> Result<(Document, u64), SessionError> {
        let document = self.document.clone().ok_or(SessionError::NoDocument)?;
        if self.loading.get(kind) {
            return Err(SessionError::Busy(kind));
        }
        self.loading.set(kind, true);
        Ok((document, self.generation))
    }
}

/// The client-side controller for one study session. Holds the uploaded
/// document and all state derived from it, and sequences user actions
/// against the AI flows.
///
/// State lives behind a single async mutex; the lock is never held across a
/// backend call, only around the compound updates on either side of it, so
/// no intermediate state is observable.
pub struct StudySession {
    backend: Arc<dyn GenerativeBackend>,
    retry: RetryPolicy,
    state: Arc<Mutex<SessionState>>,
}

impl StudySession {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upload a document. Replacing the document resets every derived field
    /// (summary, quiz, chat history, teach-it-back state) unconditionally
    /// and returns the view to chat.
    pub async fn set_document(&self, document: Document) {
        let mut state = self.state.lock().await;
        state.document = Some(document);
        state.generation += 1;
        state.active_view = ActiveView::Chat;
        state.reset_derived();
    }

    /// Remove the document. Same reset as an upload; the session returns to
    /// idle.
    pub async fn clear_document(&self) {
        let mut state = self.state.lock().await;
        state.document = None;
        state.generation += 1;
        state.active_view = ActiveView::Chat;
        state.reset_derived();
    }

    /// Switch the displayed view without dispatching a flow.
    pub async fn set_active_view(&self, view: ActiveView) {
        let mut state = self.state.lock().await;
        if state.document.is_some() {
            state.active_view = view;
        }
    }

    /// Request a summary of the document. Shows the summary view while
    /// loading; on failure the view reverts to chat and the error is
    /// surfaced.
    pub async fn request_summary(&self) -> Result<(), SessionError> {
        let (document, generation) = {
            let mut state = self.state.lock().await;
            let dispatch = state.begin_flow(FlowKind::Summarize)?;
            state.active_view = ActiveView::Summary;
            dispatch
        };

        let result = summarize(self.backend.as_ref(), &self.retry, SummarizeInput { document }).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(flow = %FlowKind::Summarize, "dropping result for replaced document");
            return Ok(());
        }
        state.loading.set(FlowKind::Summarize, false);
        match result {
            Ok(output) => {
                state.summary = Some(output.summary);
                Ok(())
            }
            Err(error) => {
                warn!(flow = %FlowKind::Summarize, %error, "flow failed");
                state.active_view = ActiveView::Chat;
                Err(error.into())
            }
        }
    }

    /// Generate a fresh quiz from the document.
    pub async fn request_quiz(&self) -> Result<(), SessionError> {
        self.run_quiz(None).await
    }

    /// Generate a new quiz, passing the current quiz's questions as
    /// advisory context so the model is asked not to repeat them. Novelty
    /// is best effort; nothing is enforced against the result.
    pub async fn regenerate_quiz(&self) -> Result<(), SessionError> {
        let previous = {
            let state = self.state.lock().await;
            state.quiz.as_ref().map(|quiz| quiz.questions.clone())
        };
        self.run_quiz(previous).await
    }

    async fn run_quiz(&self, previous: Option<Vec<QuizQuestion>>) -> Result<(), SessionError> {
        let (document, generation) = {
            let mut state = self.state.lock().await;
            let dispatch = state.begin_flow(FlowKind::GenerateQuiz)?;
            state.active_view = ActiveView::Quiz;
            dispatch
        };

        let result = generate_quiz(
            self.backend.as_ref(),
            &self.retry,
            QuizInput {
                document,
                previous_questions: previous,
            },
        )
        .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(flow = %FlowKind::GenerateQuiz, "dropping result for replaced document");
            return Ok(());
        }
        state.loading.set(FlowKind::GenerateQuiz, false);
        match result {
            Ok(quiz) => {
                state.quiz = Some(quiz);
                Ok(())
            }
            Err(error) => {
                warn!(flow = %FlowKind::GenerateQuiz, %error, "flow failed");
                state.active_view = ActiveView::Chat;
                Err(error.into())
            }
        }
    }

    /// Submit a chat message. The user's message is appended optimistically
    /// before the flow call; if the call fails, the append is rolled back so
    /// the history is exactly what it was before submission.
    pub async fn submit_chat(&self, question: String) -> Result<(), SessionError> {
        let (document, generation, history) = {
            let mut state = self.state.lock().await;
            let (document, generation) = state.begin_flow(FlowKind::AnswerQuestion)?;
            let history = state.chat_history.clone();
            state.chat_history.push(ChatMessage::user(question.clone()));
            (document, generation, history)
        };

        let result = answer_question(
            self.backend.as_ref(),
            AnswerInput {
                document,
                question,
                history,
            },
        )
        .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(flow = %FlowKind::AnswerQuestion, "dropping result for replaced document");
            return Ok(());
        }
        state.loading.set(FlowKind::AnswerQuestion, false);
        match result {
            Ok(output) => {
                state.chat_history.push(ChatMessage::ai(output.answer));
                Ok(())
            }
            Err(error) => {
                warn!(flow = %FlowKind::AnswerQuestion, %error, "flow failed");
                state.chat_history.pop();
                Err(error.into())
            }
        }
    }

    /// Start a teach-it-back exercise (or request a new topic). Any prior
    /// topic and grade are dropped wholesale before the flow is dispatched.
    pub async fn start_feynman(&self) -> Result<(), SessionError> {
        let (document, generation) = {
            let mut state = self.state.lock().await;
            let dispatch = state.begin_flow(FlowKind::ExtractTopic)?;
            state.active_view = ActiveView::Feynman;
            state.feynman = None;
            dispatch
        };

        let result = extract_topic(self.backend.as_ref(), document).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(flow = %FlowKind::ExtractTopic, "dropping result for replaced document");
            return Ok(());
        }
        state.loading.set(FlowKind::ExtractTopic, false);
        match result {
            Ok(output) => {
                state.feynman = Some(FeynmanData {
                    topic: output.topic,
                    grade: None,
                });
                Ok(())
            }
            Err(error) => {
                warn!(flow = %FlowKind::ExtractTopic, %error, "flow failed");
                state.active_view = ActiveView::Chat;
                Err(error.into())
            }
        }
    }

    /// Grade the student's explanation of the current topic. Requires a
    /// topic from a prior [`start_feynman`](Self::start_feynman); without
    /// one no flow call is issued. On success the grade is merged into the
    /// existing teach-it-back state, preserving the topic; on failure the
    /// state is left untouched.
    pub async fn submit_explanation(&self, explanation: String) -> Result<(), SessionError> {
        let (document, generation, topic) = {
            let mut state = self.state.lock().await;
            let topic = state
                .feynman
                .as_ref()
                .map(|data| data.topic.clone())
                .ok_or(SessionError::MissingTopic)?;
            let (document, generation) = state.begin_flow(FlowKind::GradeExplanation)?;
            (document, generation, topic)
        };

        let result = grade_explanation(
            self.backend.as_ref(),
            GradeInput {
                document,
                topic,
                explanation,
            },
        )
        .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(flow = %FlowKind::GradeExplanation, "dropping result for replaced document");
            return Ok(());
        }
        state.loading.set(FlowKind::GradeExplanation, false);
        match result {
            Ok(grade) => {
                if let Some(feynman) = &mut state.feynman {
                    feynman.grade = Some(grade);
                }
                Ok(())
            }
            Err(error) => {
                warn!(flow = %FlowKind::GradeExplanation, %error, "flow failed");
                Err(error.into())
            }
        }
    }

    /// Route the current state to the presentation mode that should render
    /// it.
    pub async fn view(&self) -> ViewState {
        let state = self.state.lock().await;
        match state.active_view {
            ActiveView::Chat => ViewState::Chat {
                history: state.chat_history.clone(),
                loading: state.loading.chat,
            },
            ActiveView::Summary => ViewState::Summary {
                summary: state.summary.clone(),
                loading: state.loading.summary,
            },
            ActiveView::Quiz => ViewState::Quiz {
                quiz: state.quiz.clone(),
                loading: state.loading.quiz,
            },
            ActiveView::Feynman => ViewState::Feynman {
                data: state.feynman.clone(),
                loading: state.loading.feynman,
                grading: state.loading.feynman_grade,
            },
        }
    }

    pub async fn document(&self) -> Option<Document> {
        self.state.lock().await.document.clone()
    }

    pub async fn active_view(&self) -> ActiveView {
        self.state.lock().await.active_view
    }

    pub async fn summary(&self) -> Option<String> {
        self.state.lock().await.summary.clone()
    }

    pub async fn quiz(&self) -> Option<QuizData> {
        self.state.lock().await.quiz.clone()
    }

    pub async fn chat_history(&self) -> Vec<ChatMessage> {
        self.state.lock().await.chat_history.clone()
    }

    pub async fn feynman(&self) -> Option<FeynmanData> {
        self.state.lock().await.feynman.clone()
    }

    pub async fn loading(&self) -> LoadingFlags {
        self.state.lock().await.loading
    }
}
