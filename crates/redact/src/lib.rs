//! Redaction of sensitive substrings in log text.
//!
//! Applies a fixed, ordered set of pattern substitutions: phone-number-shaped
//! runs, email addresses, and national-id-shaped runs, each replaced with a
//! distinct sentinel token. Rule order is part of the contract: the phone
//! rule runs before the national-id rule because a hyphenated digit run can
//! satisfy both patterns, and the first rule to match wins.
//!
//! [`redact`] is a pure function: no I/O, no shared state beyond the
//! lazily-compiled patterns.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement token for phone-number-shaped matches.
pub const PHONE_SENTINEL: &str = "[PHONE_REDACTED]";
/// Replacement token for email-shaped matches.
pub const EMAIL_SENTINEL: &str = "[EMAIL_REDACTED]";
/// Replacement token for national-id-shaped matches.
pub const NATIONAL_ID_SENTINEL: &str = "[NATIONAL_ID_REDACTED]";

// Covers 10-digit forms with -, ., or space separators, optional +1 prefix
// and parenthesized area code, plus bare 7-digit exchange-number forms.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.\s])?(?:\(\d{3}\)\s?|\b\d{3}[-.\s])?\b\d{3}[-.\s]\d{4}\b")
        .expect("phone pattern must compile")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("email pattern must compile")
});

static NATIONAL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("national-id pattern must compile"));

/// Result of a redaction pass: the scrubbed text plus per-category match
/// counts (the counts feed metrics, never correctness decisions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    pub phone_matches: usize,
    pub email_matches: usize,
    pub national_id_matches: usize,
}

impl Redaction {
    pub fn total_matches(&self) -> usize {
        self.phone_matches + self.email_matches + self.national_id_matches
    }
}

/// Scrub recognizable sensitive substrings from `text`.
///
/// Rules apply in order: phone, email, national-id. Each category's matches
/// are replaced with its sentinel token.
pub fn redact(text: &str) -> Redaction {
    let (text, phone_matches) = apply(&PHONE, text, PHONE_SENTINEL);
    let (text, email_matches) = apply(&EMAIL, &text, EMAIL_SENTINEL);
    let (text, national_id_matches) = apply(&NATIONAL_ID, &text, NATIONAL_ID_SENTINEL);

    if phone_matches > 0 {
        metrics::counter!("redactions_total", "category" => "phone").increment(phone_matches as u64);
    }
    if email_matches > 0 {
        metrics::counter!("redactions_total", "category" => "email").increment(email_matches as u64);
    }
    if national_id_matches > 0 {
        metrics::counter!("redactions_total", "category" => "national_id")
            .increment(national_id_matches as u64);
    }

    Redaction {
        text,
        phone_matches,
        email_matches,
        national_id_matches,
    }
}

fn apply(pattern: &Regex, text: &str, sentinel: &str) -> (String, usize) {
    let count = pattern.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (pattern.replace_all(text, sentinel).into_owned(), count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_ten_digit_phone() {
        let out = redact("call 555-123-4567 today");
        assert_eq!(out.text, format!("call {PHONE_SENTINEL} today"));
        assert_eq!(out.phone_matches, 1);
    }

    #[test]
    fn redacts_seven_digit_phone() {
        let out = redact("User 555-0199 accessed the dashboard");
        assert!(out.text.contains(PHONE_SENTINEL));
        assert!(!out.text.contains("555-0199"));
    }

    #[test]
    fn redacts_phone_with_spaces_and_dots() {
        for input in ["555 123 4567", "555.123.4567", "+1 555-123-4567", "(555) 123-4567"] {
            let out = redact(input);
            assert!(
                !PHONE.is_match(&out.text),
                "pattern still matches after redaction of {input:?}: {}",
                out.text
            );
            assert!(out.text.contains(PHONE_SENTINEL), "no sentinel for {input:?}");
        }
    }

    #[test]
    fn redacts_email() {
        let out = redact("contact a@b.com or ops.team+alerts@example.co.uk");
        assert_eq!(out.email_matches, 2);
        assert!(!out.text.contains('@'));
        assert!(out.text.contains(EMAIL_SENTINEL));
    }

    #[test]
    fn redacts_national_id() {
        let out = redact("ssn on file: 123-45-6789");
        assert_eq!(out.national_id_matches, 1);
        assert_eq!(out.text, format!("ssn on file: {NATIONAL_ID_SENTINEL}"));
    }

    #[test]
    fn phone_rule_wins_over_national_id_rule() {
        // A 3-3-4 hyphenated run is phone-shaped; the national-id rule must
        // never see it because the phone rule runs first.
        let out = redact("dial 555-123-4567");
        assert_eq!(out.phone_matches, 1);
        assert_eq!(out.national_id_matches, 0);
        assert!(out.text.contains(PHONE_SENTINEL));
        assert!(!out.text.contains(NATIONAL_ID_SENTINEL));
    }

    #[test]
    fn mixed_categories_in_one_line() {
        let out = redact("john.doe@example.com called from 555-123-4567 about 987-65-4321");
        assert_eq!(out.phone_matches, 1);
        assert_eq!(out.email_matches, 1);
        assert_eq!(out.national_id_matches, 1);
        assert_eq!(out.total_matches(), 3);
        for sentinel in [PHONE_SENTINEL, EMAIL_SENTINEL, NATIONAL_ID_SENTINEL] {
            assert!(out.text.contains(sentinel));
        }
    }

    #[test]
    fn clean_text_passes_through() {
        let input = "Payment processed successfully for order #12345";
        let out = redact(input);
        assert_eq!(out.text, input);
        assert_eq!(out.total_matches(), 0);
    }

    #[test]
    fn output_contains_no_residual_matches() {
        let out = redact("a@b.com 555-123-4567 123-45-6789");
        assert!(!PHONE.is_match(&out.text));
        assert!(!EMAIL.is_match(&out.text));
        assert!(!NATIONAL_ID.is_match(&out.text));
    }
}
