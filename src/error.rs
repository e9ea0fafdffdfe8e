//! Error types for the scn2reply library.
//!
//! A single fatal enum, [`DraftError`], covers the whole pipeline: the
//! drafting flow is one sequential exchange per request, so there is no
//! per-page partial-success dimension to model. Variants are grouped by
//! stage — upload/extraction, model invocation, letter assembly, I/O —
//! so the HTTP layer can map each group to a status class without string
//! matching.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scn2reply library.
#[derive(Debug, Error)]
pub enum DraftError {
    // ── Upload / extraction errors ────────────────────────────────────────
    /// The uploaded bytes are neither a PDF nor a DOCX.
    #[error("Unsupported upload: not a PDF or DOCX (first bytes: {magic:?})")]
    UnsupportedUpload { magic: [u8; 4] },

    /// The document parsed, but no text came out of it.
    ///
    /// Typically an image-only scan — there is nothing to send to the model.
    #[error("No extractable text in the uploaded document ({detail})")]
    EmptyDocument { detail: String },

    /// The extraction library rejected the document outright.
    #[error("Text extraction failed: {detail}")]
    ExtractionFailed { detail: String },

    // ── Model invocation errors ───────────────────────────────────────────
    /// No API credential available.
    #[error("API key not found: set the {var} environment variable")]
    MissingApiKey { var: String },

    /// The HTTP request to the completion endpoint could not be sent.
    #[error("Completion request failed: {detail}")]
    RequestFailed { detail: String },

    /// The API returned a non-retryable error status.
    #[error("Completion API error (HTTP {status}): {detail}")]
    ApiStatus { status: u16, detail: String },

    /// HTTP 429 after all retries — caller should back off.
    #[error("Completion API rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The API returned 5xx after all retries.
    #[error("Completion API unavailable (HTTP {status})")]
    UpstreamUnavailable { status: u16 },

    /// The completion call timed out after all retries.
    #[error("Completion API call timed out after {elapsed_ms}ms")]
    ApiTimeout { elapsed_ms: u64 },

    /// The API answered 200 but with no usable choice.
    #[error("Completion API returned an empty response")]
    EmptyCompletion,

    // ── Letter assembly / I/O errors ──────────────────────────────────────
    /// docx serialisation failed.
    #[error("Failed to assemble reply letter: {detail}")]
    ComposeFailed { detail: String },

    /// Could not create or write a generated letter file.
    #[error("Failed to write letter file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DraftError {
    /// Whether a retry at the request level could plausibly succeed.
    ///
    /// Rate limits and timeouts are transient; everything else in this enum
    /// is permanent for the same input.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DraftError::RateLimited { .. }
                | DraftError::UpstreamUnavailable { .. }
                | DraftError::ApiTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_display() {
        let e = DraftError::ApiStatus {
            status: 400,
            detail: "model not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("model not found"));
    }

    #[test]
    fn missing_api_key_names_variable() {
        let e = DraftError::MissingApiKey {
            var: "OPENAI_API_KEY".into(),
        };
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn timeout_display() {
        let e = DraftError::ApiTimeout { elapsed_ms: 61000 };
        assert!(e.to_string().contains("61000ms"));
    }

    #[test]
    fn transient_classification() {
        assert!(DraftError::RateLimited {
            retry_after_secs: None
        }
        .is_transient());
        assert!(DraftError::ApiTimeout { elapsed_ms: 1 }.is_transient());
        assert!(!DraftError::EmptyCompletion.is_transient());
        assert!(!DraftError::UnsupportedUpload { magic: *b"GIF8" }.is_transient());
    }
}
