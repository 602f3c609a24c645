use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::ChatBackend;
use super::types::{ChatMessage, GenerationSettings, MessageRole};
use crate::utils::GatewayError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Chat backend talking to the Gemini `generateContent` REST endpoint
///
/// The endpoint is stateless; conversation history travels with every
/// request, so the backend itself holds no per-conversation state.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    settings: GenerationSettings,
}

impl GeminiBackend {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        api_key_env: impl Into<String>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            api_key_env: api_key_env.into(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn generate(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, GatewayError> {
        self.ensure_configured()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let body = GenerateContentRequest::build(history, message, &self.settings);
        debug!(
            model = %self.model,
            turns = body.contents.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let error = classify_http_error(status, &body_text);
            warn!(status = status.as_u16(), kind = error.kind(), "Gemini API request failed");
            return Err(error);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                GatewayError::Integrity(format!("malformed response: {}", e.without_url()))
            })?;

        extract_text(parsed)
    }

    fn name(&self) -> String {
        self.model.clone()
    }

    fn ensure_configured(&self) -> Result<(), GatewayError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(GatewayError::Configuration(format!(
                "set {} or gemini.api_key",
                self.api_key_env
            ))),
        }
    }
}

fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

/// Map a transport-level failure (no HTTP status available)
///
/// The URL is stripped so error text never carries request details.
fn classify_transport_error(err: reqwest::Error) -> GatewayError {
    let err = err.without_url();
    if err.is_timeout() {
        GatewayError::Connectivity(format!("request timed out: {}", err))
    } else if err.is_connect() || err.is_request() {
        GatewayError::Connectivity(err.to_string())
    } else if err.is_decode() || err.is_body() {
        GatewayError::Integrity(err.to_string())
    } else {
        GatewayError::Unknown(err.to_string())
    }
}

/// Map a non-success HTTP response to a gateway error
fn classify_http_error(status: StatusCode, body: &str) -> GatewayError {
    let parsed = serde_json::from_str::<ErrorWrapper>(body).ok().map(|w| w.error);

    let remote_status = parsed
        .as_ref()
        .and_then(|e| e.status.clone())
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });
    let invalid_key = parsed
        .as_ref()
        .map(|e| {
            e.details
                .iter()
                .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
        })
        .unwrap_or(false)
        || message.contains("API key not valid");

    if invalid_key || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        GatewayError::Authentication(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS || remote_status == "RESOURCE_EXHAUSTED" {
        GatewayError::RateLimit(message)
    } else if status == StatusCode::NOT_FOUND {
        GatewayError::ModelUnavailable(message)
    } else {
        GatewayError::Unknown(message)
    }
}

/// Join the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GatewayError::Integrity("empty response".to_string()));
    }
    Ok(text)
}

// Wire structures for the generateContent endpoint

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn build(history: &[ChatMessage], message: &str, settings: &GenerationSettings) -> Self {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|msg| Content::text(Some(gemini_role(msg.role)), &msg.content))
            .collect();
        contents.push(Content::text(Some("user"), message));

        Self {
            contents,
            system_instruction: settings
                .system_prompt
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| Content::text(None, s)),
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&'static str>, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}
