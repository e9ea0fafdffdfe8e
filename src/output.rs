//! Output types: the drafted reply plus everything learned along the way.

use serde::{Deserialize, Serialize};

/// What the pipeline learned about the notice, independent of the reply.
///
/// Lives for the duration of one request; nothing here is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoticeRecord {
    /// GSTIN scraped from the notice text (`None` = not found).
    pub gstin: Option<String>,
    /// Noticee's legal name, derived by the model when enabled.
    pub legal_name: Option<String>,
    /// Noticee's address, derived by the model when enabled.
    pub address: Option<String>,
    /// Characters of notice text actually sent to the model (post-truncation).
    pub notice_chars: usize,
}

/// Result of drafting one reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOutput {
    /// The model's reply text, verbatim.
    pub reply: String,
    /// Scraped and derived notice fields.
    pub record: NoticeRecord,
    /// Timing and token accounting.
    pub stats: DraftStats,
}

/// Timing and token accounting for one draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Retries spent across all completion calls for this draft.
    pub retries: u32,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_round_trips_through_json() {
        let output = DraftOutput {
            reply: "ground one\nground two".into(),
            record: NoticeRecord {
                gstin: Some("27AAPFU0939F1ZV".into()),
                legal_name: None,
                address: None,
                notice_chars: 950,
            },
            stats: DraftStats {
                prompt_tokens: 120,
                completion_tokens: 80,
                retries: 1,
                extract_duration_ms: 4,
                llm_duration_ms: 900,
                total_duration_ms: 910,
            },
        };

        let json = serde_json::to_string(&output).unwrap();
        let back: DraftOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record.gstin.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(back.stats.completion_tokens, 80);
        // Absent fields serialise as null, not as a sentinel string.
        assert!(json.contains("\"legal_name\":null"));
    }
}
