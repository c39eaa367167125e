use crate::{
    backend::{GenerateRequest, GenerativeBackend},
    errors::{FlowError, FlowResult},
};
use serde_json::Value;
use std::{collections::VecDeque, sync::Mutex, time::Duration};

/// Result for a mocked `generate` call: a JSON value to return, an error,
/// or either of those after a simulated network delay (useful with paused
/// tokio time to hold a flow in flight).
pub enum MockGenerateResult {
    Value(Value),
    Error(FlowError),
    Delayed(Duration, Box<MockGenerateResult>),
}

impl MockGenerateResult {
    /// Construct a result that yields the provided JSON value.
    #[must_use]
    pub fn value(value: Value) -> Self {
        Self::Value(value)
    }

    /// Construct a result that yields the provided error.
    #[must_use]
    pub fn error(error: FlowError) -> Self {
        Self::Error(error)
    }

    /// Wrap a result so it resolves only after `delay` has elapsed.
    #[must_use]
    pub fn delayed(delay: Duration, inner: Self) -> Self {
        Self::Delayed(delay, Box::new(inner))
    }
}

impl From<Value> for MockGenerateResult {
    fn from(value: Value) -> Self {
        Self::value(value)
    }
}

impl From<FlowError> for MockGenerateResult {
    fn from(error: FlowError) -> Self {
        Self::error(error)
    }
}

#[derive(Default)]
struct MockBackendState {
    mocked_results: VecDeque<MockGenerateResult>,
    tracked_requests: Vec<GenerateRequest>,
}

/// A mock generative backend for testing that tracks requests and yields
/// predefined results in FIFO order. Running out of enqueued results is a
/// backend error, so a test that issues more calls than it mocked fails
/// loudly instead of hanging.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockBackendState>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a single mocked result.
    pub fn enqueue<R>(&self, result: R) -> &Self
    where
        R: Into<MockGenerateResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.push_back(result.into());
        drop(state);
        self
    }

    /// Enqueue several mocked results at once.
    pub fn enqueue_all<I>(&self, results: I) -> &Self
    where
        I: IntoIterator<Item = MockGenerateResult>,
    {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.mocked_results.extend(results);
        drop(state);
        self
    }

    /// The requests received so far, in order.
    #[must_use]
    pub fn tracked_requests(&self) -> Vec<GenerateRequest> {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.clone()
    }

    /// The number of `generate` calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        let state = self.state.lock().expect("mock state poisoned");
        state.tracked_requests.len()
    }
}

#[async_trait::async_trait]
impl GenerativeBackend for MockBackend {
    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: GenerateRequest) -> FlowResult<Value> {
        let mut result = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.tracked_requests.push(request);
            state.mocked_results.pop_front().ok_or_else(|| {
                FlowError::Backend("mock backend has no more enqueued results".to_string())
            })?
        };

        while let MockGenerateResult::Delayed(delay, inner) = result {
            tokio::time::sleep(delay).await;
            result = *inner;
        }

        match result {
            MockGenerateResult::Value(value) => Ok(value),
            MockGenerateResult::Error(error) => Err(error),
            MockGenerateResult::Delayed(..) => unreachable!(),
        }
    }
}
