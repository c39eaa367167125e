mod errors;
mod session;
mod types;

pub use errors::SessionError;
pub use session::StudySession;
pub use types::{ActiveView, FlowKind, LoadingFlags, ViewState};
