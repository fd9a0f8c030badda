use serde::{Deserialize, Serialize};

/// Payload for the hosted text-generation endpoint.
#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a> {
    pub inputs: &'a str,
}

/// One element of the text-generation response array.
#[derive(Debug, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub generated_text: Option<String>,
}

/// Error body returned by the inference endpoint on non-success statuses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpstreamErrorShape {
    #[serde(default)]
    pub error: Option<String>,
    /// Seconds until the model is expected to be ready.
    #[serde(default)]
    pub estimated_time: Option<f64>,
}

/// Body accepted by `POST /api/generate-ai`.
#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateRequest {
    pub input: String,
}

/// Successful body of `POST /api/generate-ai`.
#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateResponse {
    pub result: String,
}

/// Error body shared by the inbound endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}
