//! System prompts for reply drafting.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the drafting behaviour (tone,
//!    structure, what to contest) requires editing exactly one place.
//!
//! 2. **Testability** — unit and integration tests can import and inspect
//!    prompts directly without spinning up a real model.
//!
//! Callers can override the default via
//! [`crate::config::DraftConfig::system_prompt`]; the constants here are
//! used only when no override (and no reference document or form field)
//! is provided.

/// Default system prompt for drafting a reply to a show-cause notice.
///
/// The body must come back as bare numbered lines: the letter assembler
/// splits the response on line breaks and renders each line as one
/// numbered paragraph, so any markdown or preamble would leak into the
/// letter verbatim.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a senior GST practitioner drafting a reply to a show cause notice issued under the CGST Act.

Follow these rules precisely:

1. GROUNDS
   - Address every allegation raised in the notice, one ground per line
   - Cite the relevant section or rule when the notice itself names one
   - Contest factual assertions only where the notice text supports doing so

2. TONE
   - Formal, respectful, addressed to the proper officer
   - No admissions of liability; reserve the right to add further grounds

3. OUTPUT FORMAT
   - Output ONLY the grounds of reply, one ground per line
   - Do NOT number the lines; numbering is applied during formatting
   - Do NOT add salutations, headings, or closing text
   - Do NOT use markdown of any kind"#;

/// System prompt for the optional party-details derivation call.
///
/// Asks for strict JSON so the response can be parsed mechanically. The
/// model occasionally wraps JSON in code fences anyway; the parser strips
/// them before deserialising.
pub const PARTY_SYSTEM_PROMPT: &str = r#"Extract the legal name and address of the noticee (the taxpayer the notice is addressed to) from the notice text.

Respond with exactly one JSON object and nothing else:
{"legal_name": "...", "address": "..."}

Use null for a field that does not appear in the text."#;

/// Wrap instruction text recovered from a reference document.
///
/// Reference uploads are finished sample replies or office drafting notes,
/// not imperative prompts; the preamble turns them into one.
pub fn reference_instruction(reference_text: &str) -> String {
    format!(
        "Draft the reply following the style and structure of this reference material:\n\n\"\"\"{}\"\"\"\n\nOutput only the grounds of reply, one ground per line, without numbering or markdown.",
        reference_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_forbids_markdown() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("markdown"));
    }

    #[test]
    fn reference_instruction_embeds_text() {
        let wrapped = reference_instruction("keep paragraphs short");
        assert!(wrapped.contains("keep paragraphs short"));
        assert!(wrapped.contains("one ground per line"));
    }
}
