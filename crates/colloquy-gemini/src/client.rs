// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client shared by the Google REST adapters.
//!
//! Provides [`GoogleClient`], which handles authentication, JSON request
//! construction, and transient error retry.

use std::time::Duration;

use colloquy_core::ColloquyError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::ApiErrorResponse;

/// Which error variant failures of this client are reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Generation and embedding (`ColloquyError::Provider`).
    Gemini,
    /// Speech-to-text and text-to-speech (`ColloquyError::Speech`).
    Speech,
}

impl Service {
    fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> ColloquyError {
        match self {
            Service::Gemini => ColloquyError::Provider { message, source },
            Service::Speech => ColloquyError::Speech { message, source },
        }
    }
}

/// HTTP client for Google API communication.
///
/// Manages the API key header, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct GoogleClient {
    client: reqwest::Client,
    base_url: String,
    service: Service,
    max_retries: u32,
}

impl GoogleClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - Google API key, sent as `x-goog-api-key`
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `service` - error family for failures
    pub fn new(api_key: &str, base_url: &str, service: Service) -> Result<Self, ColloquyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| ColloquyError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| service.error(format!("failed to build HTTP client: {e}"), Some(Box::new(e))))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
            max_retries: 1,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `body` to `{base_url}/{path}` and decodes the JSON response.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ColloquyError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| {
                    self.service
                        .error(format!("HTTP request failed: {e}"), Some(Box::new(e)))
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| {
                    self.service
                        .error(format!("failed to read response body: {e}"), Some(Box::new(e)))
                })?;
                return serde_json::from_str(&text).map_err(|e| {
                    self.service
                        .error(format!("failed to parse API response: {e}"), Some(Box::new(e)))
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(self.service.error(format!("API returned {status}: {body}"), None));
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Google API error ({} {}): {}",
                    api_err.error.code, api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(self.service.error(message, None));
        }

        Err(last_error
            .unwrap_or_else(|| self.service.error("request failed after retries".into(), None)))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

/// Resolves an API key: configured value first, then the named environment variables.
pub fn resolve_api_key(
    configured: &[Option<&str>],
    env_vars: &[&str],
) -> Result<String, ColloquyError> {
    if let Some(key) = configured
        .iter()
        .flatten()
        .find(|k| !k.trim().is_empty())
    {
        return Ok(key.to_string());
    }

    env_vars
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| {
            ColloquyError::Config(format!(
                "Google API key not found. Set it in config or one of: {}",
                env_vars.join(", ")
            ))
        })
}
