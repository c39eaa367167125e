use crate::{
    errors::FlowResult,
    types::{Document, JSONSchema},
};
use serde_json::Value;

/// A prompt ready to be sent to the backend. The document is carried as a
/// structured reference rather than inlined into the instruction text; the
/// backend resolves it into whatever part encoding the provider expects.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// The rendered instruction text for this flow.
    pub instructions: String,
    /// The document the instructions refer to.
    pub document: Document,
}

/// A single generation request: a rendered prompt plus the JSON schema the
/// model output must conform to.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: RenderedPrompt,
    /// A short name for the expected output shape, e.g. "quiz".
    pub schema_name: &'static str,
    /// The JSON schema handed to the backend as the response format.
    pub response_schema: JSONSchema,
}

/// The boundary to the external generation service. Implementations make
/// exactly one outbound call per `generate` invocation and surface failures
/// through the `FlowError` taxonomy (rate limits as
/// `FlowError::RateLimited` so the retry policy can classify them).
#[async_trait::async_trait]
pub trait GenerativeBackend: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn generate(&self, request: GenerateRequest) -> FlowResult<Value>;
}
