//! Configuration types for notice-reply drafting.
//!
//! All drafting behaviour is controlled through [`DraftConfig`], built via
//! its [`DraftConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across the server state, serialise it for
//! logging, and diff two runs to understand why their letters differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::DraftError;
use serde::{Deserialize, Serialize};

/// Environment variable holding the API credential when no override is set.
pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Configuration for drafting a reply from a show-cause notice.
///
/// Built via [`DraftConfig::builder()`] or [`DraftConfig::default()`].
///
/// # Example
/// ```rust
/// use scn2reply::DraftConfig;
///
/// let config = DraftConfig::builder()
///     .model("gpt-4o-mini")
///     .notice_char_budget(3000)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Chat model identifier. Default: `gpt-4o-mini`.
    pub model: String,

    /// Base URL of the OpenAI-compatible API. Default: `https://api.openai.com/v1`.
    ///
    /// Tests point this at an in-process mock; deployments can point it at
    /// any compatible gateway.
    pub api_base: String,

    /// Explicit API key. When `None`, the key is read from
    /// [`DEFAULT_API_KEY_VAR`] at client construction time.
    ///
    /// Skipped during serialisation so a logged config never leaks the
    /// credential.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Replies to statutory notices should be sober and repeatable; low
    /// temperature keeps the model close to the notice's own wording.
    pub temperature: f32,

    /// Maximum tokens the model may generate for the reply. Default: 1024.
    ///
    /// A reply letter body is a page of numbered points; 1024 covers that
    /// comfortably without letting a runaway completion inflate cost.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient API failure. Default: 3.
    ///
    /// 429s and 5xx responses from completion APIs are frequent and
    /// short-lived. Permanent errors (bad key, 400) are never retried.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Per-completion-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Character budget for the extracted notice text. Default: 4000.
    ///
    /// The notice is truncated to this many characters before being sent as
    /// the user message. Notices repeat themselves past the operative
    /// paragraphs, and a bounded excerpt keeps per-request token cost
    /// predictable.
    pub notice_char_budget: usize,

    /// Character budget for text extracted from a reference document used
    /// as the instruction. Default: 2000.
    pub reference_char_budget: usize,

    /// Whether to make a second completion call deriving the noticee's
    /// legal name and address from the notice text. Default: true.
    ///
    /// A failure in this step never fails the draft — the fields stay
    /// empty and the letter renders without them.
    pub derive_party: bool,

    /// Letterhead line rendered centred at the top of every reply.
    pub letterhead: String,

    /// Custom system prompt. If `None`, uses the built-in default.
    pub system_prompt: Option<String>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens: 1024,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            notice_char_budget: 4000,
            reference_char_budget: 2000,
            derive_party: true,
            letterhead: "Tax Consultants & Associates".to_string(),
            system_prompt: None,
        }
    }
}

impl DraftConfig {
    /// Create a new builder for `DraftConfig`.
    pub fn builder() -> DraftConfigBuilder {
        DraftConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DraftConfig`].
#[derive(Debug)]
pub struct DraftConfigBuilder {
    config: DraftConfig,
}

impl DraftConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        // A trailing slash would double up when request paths are joined.
        self.config.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn notice_char_budget(mut self, chars: usize) -> Self {
        self.config.notice_char_budget = chars;
        self
    }

    pub fn reference_char_budget(mut self, chars: usize) -> Self {
        self.config.reference_char_budget = chars;
        self
    }

    pub fn derive_party(mut self, v: bool) -> Self {
        self.config.derive_party = v;
        self
    }

    pub fn letterhead(mut self, text: impl Into<String>) -> Self {
        self.config.letterhead = text.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DraftConfig, DraftError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(DraftError::InvalidConfig("Model must not be empty".into()));
        }
        if c.notice_char_budget < 200 {
            return Err(DraftError::InvalidConfig(format!(
                "Notice character budget must be ≥ 200, got {}",
                c.notice_char_budget
            )));
        }
        if c.max_tokens == 0 {
            return Err(DraftError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = DraftConfig::builder().build().unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.notice_char_budget, 4000);
        assert!(config.derive_party);
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let config = DraftConfig::builder()
            .api_base("http://127.0.0.1:9999/v1/")
            .build()
            .unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:9999/v1");
    }

    #[test]
    fn tiny_notice_budget_is_rejected() {
        let err = DraftConfig::builder()
            .notice_char_budget(50)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("200"));
    }

    #[test]
    fn temperature_is_clamped() {
        let config = DraftConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn serialised_config_omits_api_key() {
        let config = DraftConfig::builder().api_key("sk-secret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
