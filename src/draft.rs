//! Drafting entry points: run the whole pipeline for one notice.
//!
//! [`draft`] is the primary library API: bytes in, [`DraftOutput`] out. The
//! HTTP layer is a thin caller of this module — anything it can do, a
//! library user can do without a server.

use crate::config::DraftConfig;
use crate::error::DraftError;
use crate::output::{DraftOutput, DraftStats, NoticeRecord};
use crate::pipeline::llm::ChatClient;
use crate::pipeline::{extract, scrape};
use crate::prompts;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the drafting instruction comes from.
///
/// Precedence when the server receives several at once: a reference
/// document beats the form field beats the built-in default — the
/// reference upload is the most deliberate act the caller can take.
#[derive(Debug, Clone, Default)]
pub enum InstructionSource {
    /// Built-in default prompt (or the config override, when set).
    #[default]
    Default,
    /// Caller-supplied instruction text.
    Inline(String),
    /// A second uploaded document whose extracted text becomes the instruction.
    Reference(Vec<u8>),
}

/// Draft a reply for the given notice bytes.
///
/// Builds a [`ChatClient`] from the config on every call. Long-lived
/// callers (the server) should construct the client once and use
/// [`draft_with_client`] instead.
pub async fn draft(
    notice: &[u8],
    instruction: InstructionSource,
    config: &DraftConfig,
) -> Result<DraftOutput, DraftError> {
    let client = ChatClient::resolve(config)?;
    draft_with_client(notice, instruction, config, &client).await
}

/// Draft a reply using a pre-built client.
pub async fn draft_with_client(
    notice: &[u8],
    instruction: InstructionSource,
    config: &DraftConfig,
    client: &ChatClient,
) -> Result<DraftOutput, DraftError> {
    let total_start = Instant::now();

    // ── Step 1: Extract notice text ──────────────────────────────────────
    let extract_start = Instant::now();
    let notice_text = extract::extract_text(notice, config.notice_char_budget)?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        chars = notice_text.chars().count(),
        elapsed_ms = extract_duration_ms,
        "extracted notice text"
    );

    // ── Step 2: Scrape the GSTIN (independent of the model) ──────────────
    let gstin = scrape::scrape_gstin(&notice_text);
    debug!(gstin = gstin.as_deref().unwrap_or("-"), "scraped GSTIN");

    // ── Step 3: Assemble the instruction ─────────────────────────────────
    let system_prompt = resolve_instruction(&instruction, config)?;

    // ── Step 4: Model invocation ─────────────────────────────────────────
    let llm_start = Instant::now();
    let reply = client.chat(&system_prompt, &notice_text, config).await?;
    let mut stats = DraftStats {
        prompt_tokens: reply.prompt_tokens as u64,
        completion_tokens: reply.completion_tokens as u64,
        retries: reply.retries,
        extract_duration_ms,
        ..DraftStats::default()
    };

    // ── Step 5: Optional party derivation ────────────────────────────────
    let mut record = NoticeRecord {
        gstin,
        notice_chars: notice_text.chars().count(),
        ..NoticeRecord::default()
    };
    if config.derive_party {
        match derive_party(client, &notice_text, config).await {
            Ok((party, derive_stats)) => {
                record.legal_name = party.legal_name;
                record.address = party.address;
                stats.prompt_tokens += derive_stats.0;
                stats.completion_tokens += derive_stats.1;
                stats.retries += derive_stats.2;
            }
            // Party details are decoration; a failure here must not lose
            // the drafted reply.
            Err(e) => warn!(error = %e, "party derivation failed; continuing without"),
        }
    }

    stats.llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        gstin = record.gstin.as_deref().unwrap_or("-"),
        reply_chars = reply.content.len(),
        total_ms = stats.total_duration_ms,
        "draft complete"
    );

    Ok(DraftOutput {
        reply: reply.content,
        record,
        stats,
    })
}

/// Draft a reply and write the composed letter to `path`.
///
/// Uses atomic write (temp file + rename) so a crash mid-write never
/// leaves a truncated `.docx` behind.
pub async fn draft_to_file(
    notice: &[u8],
    instruction: InstructionSource,
    config: &DraftConfig,
    reply_date: chrono::NaiveDate,
    path: impl AsRef<Path>,
) -> Result<DraftOutput, DraftError> {
    let output = draft(notice, instruction, config).await?;

    let letter = crate::pipeline::compose::ReplyLetter {
        letterhead: &config.letterhead,
        reply_date,
        party: &output.record,
        body: &output.reply,
    };
    let bytes = crate::pipeline::compose::to_bytes(&letter)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DraftError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| DraftError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| DraftError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Resolve the instruction source into the system prompt text.
fn resolve_instruction(
    instruction: &InstructionSource,
    config: &DraftConfig,
) -> Result<String, DraftError> {
    match instruction {
        InstructionSource::Default => Ok(config
            .system_prompt
            .clone()
            .unwrap_or_else(|| prompts::DEFAULT_SYSTEM_PROMPT.to_string())),
        InstructionSource::Inline(text) => Ok(text.clone()),
        InstructionSource::Reference(bytes) => {
            let reference_text = extract::extract_text(bytes, config.reference_char_budget)?;
            Ok(prompts::reference_instruction(&reference_text))
        }
    }
}

// ── Party derivation ─────────────────────────────────────────────────────

/// Model answer for the party-details call.
#[derive(Debug, Default, Deserialize)]
struct PartyDetails {
    legal_name: Option<String>,
    address: Option<String>,
}

/// Ask the model for the noticee's legal name and address as JSON.
///
/// Returns the parsed details plus `(prompt_tokens, completion_tokens,
/// retries)` so the caller can fold them into the draft stats.
async fn derive_party(
    client: &ChatClient,
    notice_text: &str,
    config: &DraftConfig,
) -> Result<(PartyDetails, (u64, u64, u32)), DraftError> {
    let reply = client
        .chat(prompts::PARTY_SYSTEM_PROMPT, notice_text, config)
        .await?;
    let details = parse_party_json(&reply.content);
    Ok((
        details,
        (
            reply.prompt_tokens as u64,
            reply.completion_tokens as u64,
            reply.retries,
        ),
    ))
}

/// Parse the party JSON leniently.
///
/// Models occasionally wrap JSON in code fences despite instructions;
/// strip them before deserialising. Anything unparseable degrades to
/// empty details.
fn parse_party_json(content: &str) -> PartyDetails {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    match serde_json::from_str::<PartyDetails>(trimmed) {
        Ok(details) => details,
        Err(e) => {
            warn!(error = %e, "party JSON did not parse");
            PartyDetails::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_default_uses_builtin_prompt() {
        let config = DraftConfig::default();
        let prompt = resolve_instruction(&InstructionSource::Default, &config).unwrap();
        assert_eq!(prompt, prompts::DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn instruction_default_honours_config_override() {
        let config = DraftConfig::builder()
            .system_prompt("custom drafting rules")
            .build()
            .unwrap();
        let prompt = resolve_instruction(&InstructionSource::Default, &config).unwrap();
        assert_eq!(prompt, "custom drafting rules");
    }

    #[test]
    fn instruction_inline_passes_through() {
        let config = DraftConfig::default();
        let prompt = resolve_instruction(
            &InstructionSource::Inline("contest the limitation period".into()),
            &config,
        )
        .unwrap();
        assert_eq!(prompt, "contest the limitation period");
    }

    #[test]
    fn instruction_reference_extracts_and_wraps() {
        use docx_rs::{Docx, Paragraph, Run};

        let mut buf = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text("cite section 75(4) on hearings")),
            )
            .build()
            .pack(&mut buf)
            .unwrap();

        let config = DraftConfig::default();
        let prompt = resolve_instruction(
            &InstructionSource::Reference(buf.into_inner()),
            &config,
        )
        .unwrap();
        assert!(prompt.contains("cite section 75(4) on hearings"));
        assert!(prompt.contains("reference material"));
    }

    #[test]
    fn party_json_parses_plain_object() {
        let details =
            parse_party_json(r#"{"legal_name": "M/s Example Traders", "address": "Pune"}"#);
        assert_eq!(details.legal_name.as_deref(), Some("M/s Example Traders"));
        assert_eq!(details.address.as_deref(), Some("Pune"));
    }

    #[test]
    fn party_json_strips_code_fences() {
        let details = parse_party_json("```json\n{\"legal_name\": \"X\", \"address\": null}\n```");
        assert_eq!(details.legal_name.as_deref(), Some("X"));
        assert!(details.address.is_none());
    }

    #[test]
    fn party_json_garbage_degrades_to_empty() {
        let details = parse_party_json("I could not find the details.");
        assert!(details.legal_name.is_none());
        assert!(details.address.is_none());
    }
}
