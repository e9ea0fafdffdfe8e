//! Letter assembly: render the model's reply into a fixed-layout `.docx`.
//!
//! The layout is deliberately rigid — letterhead, salutation with the date
//! at a right tab stop, party block, heading, numbered grounds, signature —
//! because reply letters to tax notices follow a house style, not the
//! model's whims. The model contributes only the body lines; everything
//! else is template.
//!
//! The assembler is a pure function of its inputs: the reply date is a
//! parameter rather than a clock read, so the same [`ReplyLetter`] always
//! serialises to byte-identical output. Callers that want "today" pass it
//! in (see the upload handler).

use crate::error::DraftError;
use crate::output::NoticeRecord;
use chrono::NaiveDate;
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat,
    Numbering, NumberingId, Paragraph, Run, Start, Tab, TabValueType,
};

/// Numbering definition id for the grounds list.
const GROUNDS_NUMBERING: usize = 2;

/// Twips position of the right tab stop carrying the reply date.
const DATE_TAB_POS: usize = 9026;

/// Fixed paragraphs surrounding the numbered grounds:
/// letterhead, date line, two addressee lines, three party lines,
/// section heading, and the two-line signature block.
pub const FIXED_PARAGRAPHS: usize = 10;

/// Everything needed to render one reply letter.
#[derive(Debug, Clone)]
pub struct ReplyLetter<'a> {
    pub letterhead: &'a str,
    pub reply_date: NaiveDate,
    pub party: &'a NoticeRecord,
    pub body: &'a str,
}

/// Split the reply body into the lines that become numbered grounds.
///
/// Line breaks are the model's ground separator (the prompt demands one
/// ground per line); blank lines carry nothing and are dropped. The text
/// of each kept line is embedded verbatim.
pub fn body_lines(body: &str) -> Vec<&str> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Assemble the full letter as a `docx_rs::Docx` value.
pub fn compose(letter: &ReplyLetter<'_>) -> Docx {
    let party = letter.party;
    let date_str = letter.reply_date.format("%d-%m-%Y").to_string();

    let gstin_line = match &party.gstin {
        Some(g) => format!("GSTIN: {g}"),
        None => "GSTIN: not traceable on record".to_string(),
    };
    let name_line = party.legal_name.as_deref().unwrap_or("The Noticee");
    let address_line = party.address.as_deref().unwrap_or("Address as per records");

    let mut docx = Docx::new()
        .add_abstract_numbering(
            AbstractNumbering::new(GROUNDS_NUMBERING).add_level(Level::new(
                0,
                Start::new(1),
                NumberFormat::new("decimal"),
                LevelText::new("%1."),
                LevelJc::new("left"),
            )),
        )
        .add_numbering(Numbering::new(GROUNDS_NUMBERING, GROUNDS_NUMBERING))
        // Letterhead
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(letter.letterhead).bold().size(32)),
        )
        // Salutation line with the date at a right tab stop
        .add_paragraph(
            Paragraph::new()
                .add_tab(Tab::new().val(TabValueType::Right).pos(DATE_TAB_POS))
                .add_run(
                    Run::new()
                        .add_text("To,")
                        .add_tab()
                        .add_text(format!("Date: {date_str}")),
                ),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("The Proper Officer,")))
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text("Office of the Commissioner of State Tax")),
        )
        // Party details
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(name_line).bold()),
        )
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(address_line)),
        )
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(gstin_line)),
        )
        // Section heading
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(
                    Run::new()
                        .add_text("Reply to the Show Cause Notice")
                        .bold()
                        .underline("single"),
                ),
        );

    // Numbered, justified grounds
    for line in body_lines(letter.body) {
        docx = docx.add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Both)
                .numbering(NumberingId::new(GROUNDS_NUMBERING), IndentLevel::new(0))
                .add_run(Run::new().add_text(line)),
        );
    }

    // Signature block
    docx.add_paragraph(
        Paragraph::new()
            .align(AlignmentType::Right)
            .add_run(Run::new().add_text("Yours faithfully,")),
    )
    .add_paragraph(
        Paragraph::new()
            .align(AlignmentType::Right)
            .add_run(Run::new().add_text("Authorised Signatory")),
    )
}

/// Serialise the letter to `.docx` bytes.
pub fn to_bytes(letter: &ReplyLetter<'_>) -> Result<Vec<u8>, DraftError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    compose(letter)
        .build()
        .pack(&mut buf)
        .map_err(|e| DraftError::ComposeFailed {
            detail: e.to_string(),
        })?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> NoticeRecord {
        NoticeRecord {
            gstin: Some("27AAPFU0939F1ZV".to_string()),
            legal_name: Some("M/s Example Traders".to_string()),
            address: Some("12 Market Road, Pune".to_string()),
            notice_chars: 1200,
        }
    }

    fn sample_letter<'a>(record: &'a NoticeRecord, body: &'a str) -> ReplyLetter<'a> {
        ReplyLetter {
            letterhead: "Tax Consultants & Associates",
            reply_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            party: record,
            body,
        }
    }

    #[test]
    fn body_lines_drop_blanks_and_trim() {
        let lines = body_lines("first ground\n\n  second ground  \n\n");
        assert_eq!(lines, vec!["first ground", "second ground"]);
    }

    #[test]
    fn paragraph_count_is_fixed_plus_grounds() {
        let record = sample_record();
        let letter = sample_letter(&record, "one\ntwo\nthree");
        let docx = compose(&letter);
        assert_eq!(docx.document.children.len(), FIXED_PARAGRAPHS + 3);
    }

    #[test]
    fn empty_body_yields_only_fixed_paragraphs() {
        let record = sample_record();
        let letter = sample_letter(&record, "");
        let docx = compose(&letter);
        assert_eq!(docx.document.children.len(), FIXED_PARAGRAPHS);
    }

    #[test]
    fn same_input_packs_to_identical_bytes() {
        let record = sample_record();
        let letter = sample_letter(&record, "ground one\nground two");
        let first = to_bytes(&letter).unwrap();
        let second = to_bytes(&letter).unwrap();
        assert_eq!(first, second, "assembler must be idempotent");
    }

    #[test]
    fn output_is_a_zip_container() {
        let record = sample_record();
        let letter = sample_letter(&record, "ground");
        let bytes = to_bytes(&letter).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let record = NoticeRecord::default();
        let letter = sample_letter(&record, "ground");
        let docx = compose(&letter);
        // Placeholders keep the paragraph count stable regardless of what
        // was scraped or derived.
        assert_eq!(docx.document.children.len(), FIXED_PARAGRAPHS + 1);
    }

    #[test]
    fn letter_text_embeds_scraped_gstin() {
        use docx_rs::{DocumentChild, ParagraphChild, RunChild};

        let record = sample_record();
        let letter = sample_letter(&record, "ground");
        let docx = compose(&letter);

        let mut all_text = String::new();
        for child in &docx.document.children {
            if let DocumentChild::Paragraph(p) = child {
                for pc in &p.children {
                    if let ParagraphChild::Run(run) = pc {
                        for rc in &run.children {
                            if let RunChild::Text(t) = rc {
                                all_text.push_str(&t.text);
                            }
                        }
                    }
                }
            }
        }

        assert!(all_text.contains("GSTIN: 27AAPFU0939F1ZV"));
        assert!(all_text.contains("Reply to the Show Cause Notice"));
        assert!(all_text.contains("Date: 14-03-2026"));
    }
}
