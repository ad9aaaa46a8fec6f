use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::llm::client::LlmProvider;
use crate::summary::SummarizeError;

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.llm.api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key is missing. Set llm.api_key in config or BRIEFLY_GEMINI_API_KEY."
            );
        }

        let model = if settings.llm.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL.to_string()
        } else {
            settings.llm.model.trim().to_string()
        };

        let endpoint = if settings.llm.endpoint.trim().is_empty() {
            DEFAULT_GEMINI_ENDPOINT.to_string()
        } else {
            settings
                .llm
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        // Request deadlines are enforced by the dispatcher, only bound the connect here.
        Ok(Self {
            http: Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .context("Failed to build Gemini HTTP client")?,
            api_key,
            model,
            endpoint,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError> {
        let body = GeminiGenerateContentRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizeError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Gemini returned {} with {} byte body", status, body.len());
            return Err(SummarizeError::ProviderHttp {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let payload: GeminiGenerateContentResponse = response
            .json()
            .await
            .map_err(|_| SummarizeError::ProviderEmptyResponse)?;

        payload
            .first_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(SummarizeError::ProviderEmptyResponse)
    }
}

/// Best-effort `error.message` from an error body, or the whole JSON document.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.pointer("/error/message").and_then(|m| m.as_str()) {
        Some(message) => Some(message.to_string()),
        None => Some(value.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct GeminiGenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiGenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}
