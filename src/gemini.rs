use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::constants;
use crate::prompt::{response_schema, SYSTEM_INSTRUCTION};
use crate::schema::{LogicResponse, SchemaError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("no Gemini API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("Gemini API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gemini API request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Gemini API returned no text")]
    EmptyResponse,
    #[error(transparent)]
    InvalidResponse(#[from] SchemaError),
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: constants::GEMINI_API_URL.clone(),
            api_key: constants::GEMINI_API_KEY.clone(),
            model: constants::GEMINI_MODEL.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

// Structures matching Gemini's generateContent endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    // Text of the first candidate; Gemini may split it across several parts.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Client for the single ladder-logic generation call.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt` with the fixed M221 instructions and returns the validated logic.
    ///
    /// Exactly one request is issued. An empty prompt or missing key fails before any I/O.
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<LogicResponse, GenerationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        if self.config.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let request_payload = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![RequestPart {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        let endpoint = self.config.endpoint();
        debug!(%endpoint, "Sending generateContent request");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Gemini API request failed");
            return Err(GenerationError::Api { status, body });
        }

        let gemini_response = response.json::<GenerateContentResponse>().await?;
        let finish_reason = gemini_response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone());

        let Some(text) = gemini_response.text() else {
            error!(?finish_reason, "Gemini response carried no text");
            return Err(GenerationError::EmptyResponse);
        };
        debug!(response_len = text.len(), ?finish_reason, "Received Gemini response");

        let logic = LogicResponse::from_json(&text).map_err(|e| {
            error!(error = %e, "Gemini response does not match the logic schema");
            e
        })?;

        info!(
            rungs = logic.rungs.len(),
            variables = logic.variables.len(),
            "Generated ladder logic"
        );
        Ok(logic)
    }
}
