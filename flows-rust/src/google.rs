use crate::{
    backend::{GenerateRequest, GenerativeBackend},
    errors::{parse_retry_hint, FlowError, FlowResult},
};
use reqwest::{
    header::{self, HeaderValue},
    Client, StatusCode,
};
use serde_json::Value;
use tracing::debug;

/// Google Gemini backend speaking the `generateContent` REST API. Structured
/// output is requested through the generation config (`responseMimeType` +
/// `responseSchema`), so the model replies with a single JSON text part.
pub struct GoogleModel {
    pub model_id: String,
    pub base_url: String,
    pub client: Client,
}

pub struct GoogleModelOptions {
    pub base_url: Option<String>,
    pub model_id: String,
    pub api_key: String,
}

impl GoogleModel {
    /// # Panics
    /// Panics if the API key is not a valid header value or the HTTP client
    /// cannot be constructed.
    #[must_use]
    pub fn new(options: GoogleModelOptions) -> Self {
        let mut headers = header::HeaderMap::new();
        let mut key_header_value: HeaderValue = options.api_key.try_into().unwrap();
        key_header_value.set_sensitive(true);
        headers.insert("x-goog-api-key", key_header_value);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        Self {
            model_id: options.model_id,
            base_url: options
                .base_url
                .unwrap_or("https://generativelanguage.googleapis.com/v1beta".to_string()),
            client: Client::builder().default_headers(headers).build().unwrap(),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeBackend for GoogleModel {
    fn provider(&self) -> &'static str {
        "google"
    }

    async fn generate(&self, request: GenerateRequest) -> FlowResult<Value> {
        let params = convert_to_google_params(&request);

        debug!(
            model_id = %self.model_id,
            schema = request.schema_name,
            "sending generateContent request"
        );

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model_id
            ))
            .json(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error_status(status, body));
        }

        let json = response.json::<google_api::GenerateContentResponse>().await?;

        let candidate = json
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates.remove(0))
                }
            })
            .ok_or_else(|| FlowError::Backend("no candidates in response".to_string()))?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .find_map(|part| part.text)
            .ok_or_else(|| FlowError::Backend("no text part in candidate".to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            FlowError::SchemaMismatch(format!("model did not return valid JSON: {e}"))
        })
    }
}

/// Map a non-success status to the flow error taxonomy. 429 carries the
/// optional "retry in N s" hint parsed out of the error body.
fn classify_error_status(status: StatusCode, body: String) -> FlowError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        FlowError::RateLimited {
            status: status.as_u16(),
            retry_after: parse_retry_hint(&body),
            message: body,
        }
    } else {
        FlowError::Backend(format!("{body} (Status {status})"))
    }
}

fn convert_to_google_params(request: &GenerateRequest) -> google_api::GenerateContentRequest {
    google_api::GenerateContentRequest {
        contents: vec![google_api::Content {
            role: "user".to_string(),
            parts: vec![
                google_api::ContentPart {
                    text: Some(request.prompt.instructions.clone()),
                    inline_data: None,
                },
                google_api::ContentPart {
                    text: None,
                    inline_data: Some(google_api::InlineData {
                        mime_type: request.prompt.document.mime_type.clone(),
                        data: request.prompt.document.data.clone(),
                    }),
                },
            ],
        }],
        generation_config: google_api::GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: request.response_schema.clone(),
        },
    }
}

mod google_api {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerateContentRequest {
        pub contents: Vec<Content>,
        pub generation_config: GenerationConfig,
    }

    #[derive(Serialize, Deserialize)]
    pub struct Content {
        pub role: String,
        pub parts: Vec<ContentPart>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ContentPart {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub inline_data: Option<InlineData>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InlineData {
        pub mime_type: String,
        pub data: String,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerationConfig {
        pub response_mime_type: String,
        pub response_schema: Value,
    }

    #[derive(Deserialize)]
    pub struct GenerateContentResponse {
        pub candidates: Option<Vec<Candidate>>,
    }

    #[derive(Deserialize)]
    pub struct Candidate {
        pub content: CandidateContent,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct CandidateContent {
        pub parts: Vec<ContentPart>,
    }
}
