use crate::types::FlowKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Flow error: {0}")]
    Flow(#[from] study_flows::FlowError),
    #[error("No document has been uploaded")]
    NoDocument,
    /// A flow of this kind is already in flight; the request was rejected
    /// before any backend call.
    #[error("A {0} request is already in progress")]
    Busy(FlowKind),
    /// Explanation submitted without an extracted topic. No flow call is
    /// issued.
    #[error("No topic to grade against; start a teach-it-back exercise first")]
    MissingTopic,
}
