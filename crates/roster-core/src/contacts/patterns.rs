//! Default validation patterns for contact fields.
//!
//! These are unanchored; [`FieldValidator`](super::FieldValidator) anchors
//! them so that the whole field has to match.

/// `local-part@domain-labels.tld` with a lowercase TLD of two or more letters.
pub const DEFAULT_EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-z]{2,}";

/// Optional `+` and up to four digit country code, optional (bracketed)
/// area code, then 6-10 digits.
pub const DEFAULT_PHONE_PATTERN: &str = r"(\+?\d{1,4}[\s-]?)?(?:\(?\d{2,4}\)?[\s-]?)?\d{6,10}";

/// Wrap a pattern so it only matches a complete field.
pub fn anchored(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}
