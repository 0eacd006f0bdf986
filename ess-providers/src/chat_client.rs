//! OpenAI-compatible chat-completions client with retry, exponential
//! backoff, timeout, and gzip.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use ess_core::config::GenerationConfig;
use ess_core::errors::GenerationError;
use ess_core::traits::ITextGenerator;

const PROVIDER: &str = "chat-completions";
const MAX_BACKOFF: Duration = Duration::from_secs(8);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

fn unavailable(reason: impl Into<String>) -> GenerationError {
    GenerationError::Unavailable {
        provider: PROVIDER.to_string(),
        reason: reason.into(),
    }
}

/// Request body for a single-prompt completion.
pub fn build_request_body(config: &GenerationConfig, prompt: &str) -> serde_json::Value {
    let request = ChatRequest {
        model: &config.model,
        temperature: config.temperature,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    };
    serde_json::to_value(&request).unwrap_or_default()
}

/// Extract the first choice's text from a completion response body.
pub fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| unavailable(format!("unreadable completion: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| GenerationError::EmptyResponse {
            provider: PROVIDER.to_string(),
        })
}

/// Blocking chat client. Without an API key it reports itself unavailable
/// and every call fails fast.
#[derive(Debug)]
pub struct ChatClient {
    config: GenerationConfig,
    http: reqwest::blocking::Client,
}

impl ChatClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .gzip(true)
            .build()
            .map_err(|e| unavailable(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl ITextGenerator for ChatClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self
            .api_key()
            .ok_or_else(|| unavailable("no API key configured"))?;
        let body = build_request_body(&self.config, prompt);

        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);
        let mut last_err = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    attempt,
                    max_retries = self.config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "generation: retrying"
                );
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }

            let sent = self
                .http
                .post(&self.config.endpoint)
                .bearer_auth(key)
                .json(&body)
                .send();

            match sent {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let text = resp
                            .text()
                            .map_err(|e| unavailable(format!("reading response: {e}")))?;
                        return parse_completion(&text);
                    }
                    // 429 is transient; every other client error is final.
                    if status.is_client_error() && status.as_u16() != 429 {
                        let body_text = resp.text().unwrap_or_default();
                        return Err(GenerationError::Rejected {
                            status: status.as_u16(),
                            body: body_text,
                        });
                    }
                    last_err = format!("HTTP {status}");
                }
                Err(e) => {
                    last_err = e.to_string();
                }
            }
        }

        Err(unavailable(format!(
            "all {} retries exhausted: {last_err}",
            self.config.max_retries
        )))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn is_available(&self) -> bool {
        self.api_key().is_some()
    }
}
