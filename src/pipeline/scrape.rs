//! Field scraping: pull the GSTIN out of free notice text.
//!
//! The GSTIN (Goods and Services Tax Identification Number) has a fixed
//! 15-character shape: 2-digit state code, 10-character PAN (5 letters,
//! 4 digits, 1 letter), entity digit, the literal `Z`, and a checksum
//! character. The scraper matches that shape and takes the first hit; it
//! deliberately does **not** validate the checksum — a notice quoting a
//! mistyped GSTIN should still be scraped as written, because the letter
//! must quote the notice, not correct it.
//!
//! This runs on the extracted text independently of the model call, so a
//! model outage never loses the scraped field.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_GSTIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][0-9]Z[0-9A-Z]").unwrap());

/// Return the first GSTIN-shaped token in `text`, or `None`.
pub fn scrape_gstin(text: &str) -> Option<String> {
    RE_GSTIN.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_valid_sample() {
        assert_eq!(
            scrape_gstin("27AAPFU0939F1ZV").as_deref(),
            Some("27AAPFU0939F1ZV")
        );
    }

    #[test]
    fn matches_embedded_in_notice_text() {
        let text = "M/s Example Traders (GSTIN: 29AABCE1234F1Z5) is hereby \
                    called upon to show cause why tax should not be demanded.";
        assert_eq!(scrape_gstin(text).as_deref(), Some("29AABCE1234F1Z5"));
    }

    #[test]
    fn first_match_wins() {
        let text = "supplier 07AAACB2230M1ZV, recipient 27AAPFU0939F1ZV";
        assert_eq!(scrape_gstin(text).as_deref(), Some("07AAACB2230M1ZV"));
    }

    #[test]
    fn absent_returns_none() {
        assert_eq!(scrape_gstin("no identifier in this text"), None);
    }

    #[test]
    fn rejects_wrong_shape() {
        // 14th char must be the literal Z.
        assert_eq!(scrape_gstin("27AAPFU0939F1XV"), None);
        // Lowercase never matches.
        assert_eq!(scrape_gstin("27aapfu0939f1zv"), None);
    }

    #[test]
    fn checksum_is_not_validated() {
        // Shape-valid, checksum garbage: still scraped as written.
        assert_eq!(
            scrape_gstin("27AAPFU0939F1Z0").as_deref(),
            Some("27AAPFU0939F1Z0")
        );
    }
}
