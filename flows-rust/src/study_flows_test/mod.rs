mod backend;

pub use backend::{MockBackend, MockGenerateResult};
