mod backend;
mod client;
mod errors;
mod flows;
pub mod google;
mod prompt;
mod retry;
pub mod study_flows_test;
mod types;

pub use backend::{GenerateRequest, GenerativeBackend, RenderedPrompt};
pub use client::{invoke, FlowOutput};
pub use errors::{parse_retry_hint, FlowError, FlowResult};
pub use flows::*;
pub use prompt::{render_answer, render_grade, render_quiz, render_summarize, render_topic};
pub use retry::{backoff_delay, Decision, RetryPolicy};
pub use types::*;
