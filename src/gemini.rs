//! Minimal client for the Gemini `generateContent` endpoint, shared by the
//! recognizer and the translator.

use crate::config::DEFAULT_MODEL;
use crate::error::{BurnsubError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

static SHARED_CLIENT: OnceLock<Arc<GeminiClient>> = OnceLock::new();

/// Google Gemini API client.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a different model (e.g., "gemini-2.0-flash").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at another server (used against mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send a request and return the text of the first candidate.
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!("Gemini API response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BurnsubError::Api(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(error) = parsed.error {
            return Err(BurnsubError::Api(format!("Gemini error: {}", error.message)));
        }

        let text: String = parsed
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(BurnsubError::Api(
                "Gemini returned no text candidate".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Return the process-wide client, creating it on first use.
///
/// The key is only consulted on the first call; later calls return the same
/// instance regardless of their arguments.
pub fn shared_client(api_key: Option<&str>, model: &str) -> Result<Arc<GeminiClient>> {
    if let Some(client) = SHARED_CLIENT.get() {
        return Ok(client.clone());
    }

    let key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            BurnsubError::Config(
                "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey"
                    .to_string(),
            )
        })?;

    let client = SHARED_CLIENT
        .get_or_init(|| Arc::new(GeminiClient::new(key.to_string()).with_model(model)));
    Ok(client.clone())
}

/// How a recognizer or translator reaches its client.
#[derive(Debug, Clone)]
pub enum ClientSource {
    /// Resolve the shared client at the first request.
    Lazy { api_key: Option<String>, model: String },
    /// Use a specific client.
    Fixed(Arc<GeminiClient>),
}

impl ClientSource {
    pub fn lazy(api_key: Option<String>, model: impl Into<String>) -> Self {
        ClientSource::Lazy {
            api_key,
            model: model.into(),
        }
    }

    pub fn fixed(client: GeminiClient) -> Self {
        ClientSource::Fixed(Arc::new(client))
    }

    pub fn get(&self) -> Result<Arc<GeminiClient>> {
        match self {
            ClientSource::Lazy { api_key, model } => shared_client(api_key.as_deref(), model),
            ClientSource::Fixed(client) => Ok(client.clone()),
        }
    }
}

// Request/Response types

#[derive(Serialize, Debug)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A single-turn text prompt.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: prompt.into(),
                }],
            }],
            generation_config: None,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize, Debug)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Debug, Default)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}
