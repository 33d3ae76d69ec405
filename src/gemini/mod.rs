pub mod parse;
pub mod prompt;
pub mod wire;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::AppConfig;
use crate::credentials::ApiKeyStore;
use crate::keywords::KeywordSuggestion;
use wire::{Content, ErrorEnvelope, GenerateRequest, GenerateResponse, GenerationConfig};

/// Provider message for an unknown model or a key that cannot see it
const NOT_FOUND_SIGNATURE: &str = "Requested entity was not found.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("API Key issue or model not found. Please ensure a valid API key is selected.")]
    CredentialRejected,

    /// Network, HTTP, parse or schema failure; the detail is for logs only
    #[error("Failed to fetch keyword data. Please try again.")]
    Failed(String),
}

/// Anything that can turn a seed keyword into suggestions
#[async_trait]
pub trait KeywordGenerator: Send + Sync {
    async fn generate(&self, seed: &str, count: u8) -> Result<Vec<KeywordSuggestion>, GenerateError>;
}

#[derive(Debug, Clone)]
struct Sampling {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

/// `generateContent` client for the Gemini REST API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    sampling: Sampling,
    keys: ApiKeyStore,
}

impl GeminiClient {
    pub fn new(config: &AppConfig, keys: ApiKeyStore) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("keyscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            sampling: Sampling {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
            },
            keys,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn request(&self, seed: &str, count: u8) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content::text(Some("user"), prompt::user_prompt(seed, count))],
            system_instruction: Content::text(None, prompt::system_instruction()),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: prompt::response_schema(),
                temperature: self.sampling.temperature,
                top_p: self.sampling.top_p,
                top_k: self.sampling.top_k,
            },
        }
    }
}

#[async_trait]
impl KeywordGenerator for GeminiClient {
    async fn generate(&self, seed: &str, count: u8) -> Result<Vec<KeywordSuggestion>, GenerateError> {
        // Read the key per call so a freshly selected one is used
        let Some(key) = self.keys.get() else {
            tracing::warn!("No API key in store at request time");
            return Err(GenerateError::CredentialRejected);
        };

        tracing::info!(model = %self.model, count, "Requesting keywords for {:?}", seed);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&self.request(seed, count))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Request to Gemini failed: {}", e);
                GenerateError::Failed(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read Gemini response: {}", e);
            GenerateError::Failed(e.to_string())
        })?;

        if !status.is_success() {
            return Err(translate_error(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unexpected Gemini response body: {}", e);
            GenerateError::Failed(e.to_string())
        })?;

        let Some(text) = parsed.text() else {
            let reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            tracing::warn!("Gemini returned no text ({})", reason);
            return Err(GenerateError::Failed(format!("empty response: {}", reason)));
        };

        let suggestions = parse::parse_suggestions(&text)?;
        tracing::debug!("Parsed {} suggestions", suggestions.len());
        Ok(suggestions)
    }
}

/// Map a non-2xx response onto the error kinds the UI distinguishes
fn translate_error(status: StatusCode, body: &str) -> GenerateError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);

    let not_found = status == StatusCode::NOT_FOUND
        || api_error.as_ref().is_some_and(|e| {
            e.status.as_deref() == Some("NOT_FOUND") || e.message.contains(NOT_FOUND_SIGNATURE)
        })
        || body.contains(NOT_FOUND_SIGNATURE);

    match api_error {
        Some(e) => tracing::error!(
            "Gemini error {} ({}): {}",
            e.code.unwrap_or(status.as_u16()),
            e.status.as_deref().unwrap_or("?"),
            e.message
        ),
        None => tracing::error!("Gemini error {}: {}", status, body.trim()),
    }

    if not_found {
        GenerateError::CredentialRejected
    } else {
        GenerateError::Failed(format!("HTTP {}", status))
    }
}
