//! OpenRouter HTTP client.

use crate::error::{OpenRouterError, OpenRouterResult};
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use vidup_config::OpenRouterConfig;

/// Prompt sent by [`OpenRouterClient::probe`].
pub const PROBE_PROMPT: &str = "Reply with the single word: pong";

/// Which headers accompany a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSet {
    /// Authorization plus the `HTTP-Referer` and `X-Title` attribution headers.
    Full,
    /// Authorization and content type only.
    Minimal,
}

/// Client for the OpenRouter chat-completion API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    api_key: String,
    referer: String,
    title: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl OpenRouterClient {
    /// Create a new client from configuration and a credential.
    pub fn from_config(config: &OpenRouterConfig, api_key: impl Into<String>) -> OpenRouterResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OpenRouterError::MissingApiKey);
        }
        if config.base_url.trim().is_empty() {
            return Err(OpenRouterError::InvalidConfig("base_url is empty".to_string()));
        }

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OpenRouterError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            referer: config.referer.clone(),
            title: config.title.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    /// Use a different model for subsequent requests.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// The fixed request used by the connectivity probe.
    pub fn probe_request(&self) -> ChatRequest {
        ChatRequest::new(self.model.clone(), PROBE_PROMPT)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
    }

    /// Send one chat-completion request and return the raw status and body.
    ///
    /// Non-success statuses are not errors here; only transport failures are.
    pub async fn chat(&self, request: &ChatRequest, headers: HeaderSet) -> OpenRouterResult<ProbeAttempt> {
        let url = self.endpoint();
        debug!("POST {} with model {} ({:?} headers)", url, request.model, headers);

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request);

        if headers == HeaderSet::Full {
            builder = builder
                .header("HTTP-Referer", &self.referer)
                .header("X-Title", &self.title);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                OpenRouterError::Connection {
                    host: self.base_url.clone(),
                }
            } else if e.is_timeout() {
                OpenRouterError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                OpenRouterError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ProbeAttempt {
            headers,
            status,
            body,
        })
    }

    /// Send the probe request, retrying once with minimal headers on a non-2xx status.
    pub async fn probe(&self) -> OpenRouterResult<ProbeReport> {
        let request = self.probe_request();
        let mut report = ProbeReport::default();

        let first = self.chat(&request, HeaderSet::Full).await?;
        let retry = !first.is_success();
        report.attempts.push(first);

        if retry {
            warn!(
                "Probe returned status {}, retrying without attribution headers",
                report.attempts[0].status
            );
            let second = self.chat(&request, HeaderSet::Minimal).await?;
            report.attempts.push(second);
        }

        if report.succeeded() {
            info!("OpenRouter probe succeeded after {} attempt(s)", report.attempts.len());
        }

        Ok(report)
    }
}

/// Shorten a response body for display, respecting char boundaries.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
