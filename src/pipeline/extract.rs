//! Text extraction: turn an uploaded document into one plain-text string.
//!
//! ## Why extract text instead of rendering pages?
//!
//! Show-cause notices are machine-generated documents with a regular text
//! layer — the allegations, sections, and the GSTIN are all selectable
//! text. `pdf-extract` reads that layer directly, which is cheap,
//! deterministic, and keeps the pipeline free of any rasterisation or
//! vision dependency. Image-only scans come out empty and are reported as
//! [`DraftError::EmptyDocument`] rather than silently producing a reply to
//! nothing.
//!
//! The format is sniffed from magic bytes, not the filename: multipart
//! filenames are caller-controlled and routinely wrong.

use crate::error::DraftError;
use tracing::debug;

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

/// Sniff the document format from magic bytes.
///
/// DOCX files are ZIP archives, so the check is `PK\x03\x04`; a renamed
/// XLSX would pass here and then fail inside the DOCX parser with a
/// meaningful error, which is acceptable.
pub fn detect_kind(bytes: &[u8]) -> Result<DocumentKind, DraftError> {
    if bytes.len() >= 5 && &bytes[0..5] == b"%PDF-" {
        return Ok(DocumentKind::Pdf);
    }
    if bytes.len() >= 4 && bytes[0..4] == [0x50, 0x4B, 0x03, 0x04] {
        return Ok(DocumentKind::Docx);
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(DraftError::UnsupportedUpload { magic })
}

/// Extract plain text from an uploaded document, truncated to `budget` chars.
///
/// All pages/paragraphs are concatenated in document order; the result is
/// trimmed and then cut at a `char` boundary. An empty result after
/// trimming is an error — there is nothing to send to the model.
pub fn extract_text(bytes: &[u8], budget: usize) -> Result<String, DraftError> {
    let kind = detect_kind(bytes)?;
    let raw = match kind {
        DocumentKind::Pdf => extract_pdf(bytes)?,
        DocumentKind::Docx => extract_docx(bytes)?,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DraftError::EmptyDocument {
            detail: format!("{kind:?} parsed but contained no text"),
        });
    }

    let text = truncate_chars(trimmed, budget);
    debug!(
        kind = ?kind,
        raw_chars = trimmed.chars().count(),
        kept_chars = text.chars().count(),
        "extracted document text"
    );
    Ok(text)
}

/// Extract the text layer of every PDF page, concatenated.
fn extract_pdf(bytes: &[u8]) -> Result<String, DraftError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| DraftError::ExtractionFailed {
        detail: e.to_string(),
    })
}

/// Walk every paragraph/run of a DOCX body and join the text, one line per
/// paragraph.
fn extract_docx(bytes: &[u8]) -> Result<String, DraftError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(bytes).map_err(|e| DraftError::ExtractionFailed {
        detail: e.to_string(),
    })?;

    let mut lines: Vec<String> = Vec::new();
    for child in docx.document.children.iter() {
        if let DocumentChild::Paragraph(para) = child {
            let mut line = String::new();
            for pc in para.children.iter() {
                if let ParagraphChild::Run(run) = pc {
                    for rc in run.children.iter() {
                        if let RunChild::Text(t) = rc {
                            line.push_str(&t.text);
                        }
                    }
                }
            }
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
    }

    Ok(lines.join("\n"))
}

/// Truncate `s` to at most `budget` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, budget: usize) -> String {
    match s.char_indices().nth(budget) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_pdf_magic() {
        assert_eq!(detect_kind(b"%PDF-1.7 rest").unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn detect_docx_magic() {
        assert_eq!(
            detect_kind(&[0x50, 0x4B, 0x03, 0x04, 0x00]).unwrap(),
            DocumentKind::Docx
        );
    }

    #[test]
    fn detect_rejects_unknown_bytes() {
        let err = detect_kind(b"GIF89a").unwrap_err();
        assert!(matches!(err, DraftError::UnsupportedUpload { .. }));
    }

    #[test]
    fn detect_rejects_short_input() {
        assert!(detect_kind(b"PK").is_err());
        assert!(detect_kind(b"").is_err());
    }

    #[test]
    fn truncate_within_budget_is_identity() {
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn truncate_cuts_at_char_boundary() {
        // Multi-byte chars: a naive byte slice would panic here.
        let s = "₹₹₹₹₹₹";
        let cut = truncate_chars(s, 3);
        assert_eq!(cut, "₹₹₹");
    }

    #[test]
    fn truncate_exact_budget() {
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdef", 5), "abcde");
    }

    #[test]
    fn docx_roundtrip_extracts_paragraph_text() {
        use docx_rs::{Docx, Paragraph, Run};

        let mut buf = std::io::Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Notice under section 73")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("GSTIN: 27AAPFU0939F1ZV")))
            .build()
            .pack(&mut buf)
            .unwrap();

        let text = extract_text(&buf.into_inner(), 4000).unwrap();
        assert!(text.contains("section 73"));
        assert!(text.contains("27AAPFU0939F1ZV"));
    }

    #[test]
    fn empty_docx_is_reported_empty() {
        use docx_rs::Docx;

        let mut buf = std::io::Cursor::new(Vec::new());
        Docx::new().build().pack(&mut buf).unwrap();

        let err = extract_text(&buf.into_inner(), 4000).unwrap_err();
        assert!(matches!(err, DraftError::EmptyDocument { .. }));
    }
}
