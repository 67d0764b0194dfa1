//! Gemini `generateContent` client producing table descriptions.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlbench_dispatch::{CODE_UNREACHABLE, Outcome, RetryPolicy, Worker};
use sqlbench_eval::profiling::{
    TableDescription, TableMetadata, check_description, description_prompt, parse_description,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().map(|p| p.text.as_str()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/models/{model}:generateContent", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    pub fn from_env(base_url: &str, model: &str) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).with_context(|| format!("{API_KEY_ENV} is not set"))?;
        Self::new(base_url, model, api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Worker<TableMetadata, TableDescription> for GeminiClient {
    async fn call(&self, table: &TableMetadata) -> Outcome<TableDescription> {
        let prompt = match description_prompt(table) {
            Ok(prompt) => prompt,
            Err(e) => return Outcome::validation(e.to_string()),
        };
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = match self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Outcome::transport(CODE_UNREACHABLE, "Api unreachable", e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (message, detail) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.message, envelope.error.status),
                Err(_) => (status.to_string(), body),
            };
            return Outcome::transport(i32::from(status.as_u16()), message, detail);
        }

        let Some(text) = response
            .json::<GenerateResponse>()
            .await
            .ok()
            .and_then(|r| r.text())
        else {
            return Outcome::validation("Model returned no text");
        };

        let description = match parse_description(&text) {
            Ok(description) => description,
            Err(_) => return Outcome::validation(format!("Model didn't respond with valid json: {text}")),
        };
        match check_description(table, &description) {
            Ok(()) => Outcome::Success(description),
            Err(reason) => Outcome::validation(reason),
        }
    }
}

/// 400 is a bad request and never retried; 418, 429, 500 and 503 are
/// transient. Anything else is denied with a warning.
pub fn retry_policy() -> RetryPolicy {
    RetryPolicy::new("gemini", |code, _attempts| match code {
        400 => false,
        418 | 429 | 500 | 503 => true,
        _ => {
            tracing::warn!(code, "no retry strategy for gemini error code");
            false
        }
    })
}
