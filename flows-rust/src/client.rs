use crate::{
    backend::{GenerateRequest, GenerativeBackend, RenderedPrompt},
    errors::{FlowError, FlowResult},
    types::JSONSchema,
};
use serde::de::DeserializeOwned;

/// The output contract of a flow: a JSON schema describing the expected
/// shape (handed to the backend as the response format) plus semantic
/// constraints the schema alone cannot express, checked after parsing.
///
/// A value returned through [`invoke`] always satisfies both.
pub trait FlowOutput: DeserializeOwned {
    /// A short name for the schema, e.g. "quiz".
    const SCHEMA_NAME: &'static str;

    /// The JSON schema of the output.
    fn schema() -> JSONSchema;

    /// Constraints beyond shape, e.g. "exactly 5 questions" or
    /// "`correct_answer` must be one of `options`".
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Invoke the backend once with a rendered prompt and return the validated,
/// typed output. A response that fails to deserialize or to satisfy
/// [`FlowOutput::validate`] is rejected as [`FlowError::SchemaMismatch`]
/// rather than returned to the caller.
pub async fn invoke<O: FlowOutput>(
    backend: &dyn GenerativeBackend,
    prompt: RenderedPrompt,
) -> FlowResult<O> {
    let value = backend
        .generate(GenerateRequest {
            prompt,
            schema_name: O::SCHEMA_NAME,
            response_schema: O::schema(),
        })
        .await?;

    let output: O = serde_json::from_value(value).map_err(|e| {
        FlowError::SchemaMismatch(format!(
            "response does not match the {} schema: {e}",
            O::SCHEMA_NAME
        ))
    })?;

    output
        .validate()
        .map_err(|reason| FlowError::SchemaMismatch(format!("{}: {reason}", O::SCHEMA_NAME)))?;

    Ok(output)
}
