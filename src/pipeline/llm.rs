//! Model invocation: one chat-completion exchange with retry/backoff.
//!
//! This module is intentionally thin transport — all prompt text lives in
//! [`crate::prompts`] so it can be changed without touching retry or
//! error-handling logic here. The wire format is the OpenAI-compatible
//! `/chat/completions` shape, which every gateway the service is deployed
//! against (and the test mock) speaks.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 5xx errors from completion APIs are transient and frequent.
//! Exponential backoff (`retry_backoff_ms * 2^attempt`) avoids hammering a
//! recovering endpoint: with 500 ms base and 3 retries the wait sequence is
//! 500 ms → 1 s → 2 s, totalling < 4 s of back-off per request. Permanent
//! errors (bad API key, 400) are not retried — they surface immediately.

use crate::config::{DraftConfig, DEFAULT_API_KEY_VAR};
use crate::error::DraftError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

/// A completed exchange: the first choice's text plus token accounting.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub retries: u32,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
///
/// Cheap to clone (the inner `reqwest::Client` is an `Arc`); the server
/// builds one at startup and shares it across requests.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl ChatClient {
    /// Build a client from the config, resolving the credential.
    ///
    /// Precedence: explicit `config.api_key`, then the `OPENAI_API_KEY`
    /// environment variable. Fails fast when neither is set so the server
    /// refuses to start instead of failing on the first upload.
    pub fn resolve(config: &DraftConfig) -> Result<Self, DraftError> {
        let api_key = match &config.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var(DEFAULT_API_KEY_VAR)
                .ok()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| DraftError::MissingApiKey {
                    var: DEFAULT_API_KEY_VAR.to_string(),
                })?,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| DraftError::RequestFailed {
                detail: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            api_key,
        })
    }

    /// Send a two-message exchange (system instruction + user content) and
    /// return the first choice's text verbatim.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        config: &DraftConfig,
    ) -> Result<ChatReply, DraftError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);
        let body = ChatRequest {
            model: &config.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let mut last_err: Option<DraftError> = None;

        for attempt in 0..=config.max_retries {
            if attempt > 0 {
                let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    attempt,
                    max_retries = config.max_retries,
                    backoff_ms = backoff,
                    "retrying completion call"
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.send_once(&url, &body).await {
                Ok(reply) => {
                    debug!(
                        prompt_tokens = reply.prompt_tokens,
                        completion_tokens = reply.completion_tokens,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "completion call succeeded"
                    );
                    return Ok(ChatReply {
                        retries: attempt,
                        ..reply
                    });
                }
                Err(e) if e.is_transient() => {
                    warn!(attempt, error = %e, "transient completion failure");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // All retries exhausted; surface the last transient error with the
        // total elapsed time for timeouts.
        Err(match last_err {
            Some(DraftError::ApiTimeout { .. }) => DraftError::ApiTimeout {
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
            Some(e) => e,
            None => DraftError::EmptyCompletion,
        })
    }

    /// One attempt: send, classify the status, parse the body.
    async fn send_once(
        &self,
        url: &str,
        body: &ChatRequest<'_>,
    ) -> Result<ChatReply, DraftError> {
        let attempt_start = Instant::now();
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DraftError::ApiTimeout {
                        elapsed_ms: attempt_start.elapsed().as_millis() as u64,
                    }
                } else {
                    DraftError::RequestFailed {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(DraftError::RateLimited { retry_after_secs });
        }
        if status.is_server_error() {
            return Err(DraftError::UpstreamUnavailable {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DraftError::ApiStatus {
                status: status.as_u16(),
                detail: truncate_detail(&detail),
            });
        }

        let completion: ChatCompletion =
            response.json().await.map_err(|e| DraftError::RequestFailed {
                detail: format!("response decode: {e}"),
            })?;

        let usage = completion.usage.unwrap_or_default();
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(DraftError::EmptyCompletion)?;

        Ok(ChatReply {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            retries: 0,
        })
    }
}

/// Keep error payloads short enough for a log line.
fn truncate_detail(detail: &str) -> String {
    const MAX: usize = 300;
    match detail.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &detail[..idx]),
        None => detail.to_string(),
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireAssistantMessage,
}

#[derive(Debug, Deserialize)]
struct WireAssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialises_two_messages() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                WireMessage {
                    role: "system",
                    content: "draft a reply",
                },
                WireMessage {
                    role: "user",
                    content: "notice text",
                },
            ],
            temperature: 0.2,
            max_tokens: 1024,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["model"], "gpt-4o-mini");
    }

    #[test]
    fn completion_parses_first_choice() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "ground one"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 40}
        }"#;
        let parsed: ChatCompletion = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("ground one")
        );
        assert_eq!(parsed.usage.unwrap().prompt_tokens, 120);
    }

    #[test]
    fn completion_tolerates_missing_usage() {
        let raw = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        let parsed: ChatCompletion = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn resolve_prefers_explicit_key() {
        let config = crate::config::DraftConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap();
        let client = ChatClient::resolve(&config).unwrap();
        assert_eq!(client.api_key, "test-key");
    }

    #[test]
    fn detail_truncation_respects_char_boundaries() {
        let long = "₹".repeat(400);
        let cut = truncate_detail(&long);
        assert!(cut.chars().count() <= 301);
        assert!(cut.ends_with('…'));
    }
}
