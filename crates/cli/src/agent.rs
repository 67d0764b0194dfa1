use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlbench_dispatch::{CODE_UNREACHABLE, Outcome, RetryPolicy, Worker};
use sqlbench_eval::BenchInput;

pub const ASK_PATH: &str = "/api/v1/agent/ask";

/// Status codes worth asking the agent again for.
pub const RETRY_CODES: [i32; 5] = [CODE_UNREACHABLE, 429, 502, 503, 504];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest<'a> {
    prompt: &'a str,
    conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AskResponse {
    message_text: String,
    requires_approval: bool,
}

/// HTTP client for the SQL-generating agent.
pub struct AgentClient {
    http: reqwest::Client,
    base_url: String,
    easy_mode: bool,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>, easy_mode: bool, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            easy_mode,
        })
    }

    pub fn ask_url(&self) -> String {
        format!("{}{ASK_PATH}", self.base_url)
    }

    /// Reachability check run before a bench when `common.run_test` is set.
    pub async fn probe(&self) -> Result<()> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .with_context(|| format!("Agent unreachable at {}", self.base_url))?;
        tracing::info!(status = response.status().as_u16(), url = %self.base_url, "agent reachable");
        Ok(())
    }
}

#[async_trait]
impl Worker<BenchInput, String> for AgentClient {
    async fn call(&self, input: &BenchInput) -> Outcome<String> {
        let prompt = match input.prompt(self.easy_mode) {
            Ok(prompt) => prompt,
            Err(e) => return Outcome::validation(format!("[ERR0] {e}")),
        };
        let request = AskRequest {
            prompt,
            conversation_id: None,
        };

        let response = match self.http.post(self.ask_url()).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                return Outcome::transport(CODE_UNREACHABLE, "[ERR3] HTTP unreachable Error", e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(input = input.id, status = status.as_u16(), "agent returned an error status");
            return Outcome::transport(
                i32::from(status.as_u16()),
                format!("[ERR3] HTTP {} Error", status.as_u16()),
                body,
            );
        }

        let answer: AskResponse = match response.json().await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(input = input.id, error = %e, "agent response format");
                return Outcome::validation("[ERR2] Response format error");
            }
        };
        if !answer.requires_approval {
            return Outcome::validation(
                "[ERR1] Agent didn't generate SQL or hasn't marked it as requiring approval",
            );
        }
        Outcome::Success(answer.message_text)
    }
}

pub fn retry_policy() -> RetryPolicy {
    RetryPolicy::on_codes(&RETRY_CODES)
}
