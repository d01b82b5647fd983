//! Pattern-based validation of the email and phone fields.

use regex::Regex;

use crate::error::{Result, RosterError};
use crate::models::config::PatternConfig;
use crate::models::contact::ContactRecord;

use super::parser::RejectReason;
use super::patterns::anchored;

/// Accepts or rejects a `(name, email, phone)` triple.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    email: Regex,
    phone: Regex,
}

impl FieldValidator {
    /// Compile the configured patterns.
    pub fn new(patterns: &PatternConfig) -> Result<Self> {
        let email = Regex::new(&anchored(&patterns.email))
            .map_err(|e| RosterError::Config(format!("invalid email pattern: {}", e)))?;
        let phone = Regex::new(&anchored(&patterns.phone))
            .map_err(|e| RosterError::Config(format!("invalid phone pattern: {}", e)))?;

        Ok(Self { email, phone })
    }

    /// Whole-field email match.
    pub fn is_valid_email(&self, email: &str) -> bool {
        self.email.is_match(email)
    }

    /// Whole-field phone match, ignoring whitespace inside the number.
    pub fn is_valid_phone(&self, phone: &str) -> bool {
        let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        self.phone.is_match(&compact)
    }

    /// Validate trimmed fields and build a record from them.
    pub fn validate(&self, name: &str, email: &str, phone: &str) -> std::result::Result<ContactRecord, RejectReason> {
        if !self.is_valid_email(email) {
            return Err(RejectReason::InvalidEmail);
        }
        if !self.is_valid_phone(phone) {
            return Err(RejectReason::InvalidPhone);
        }
        Ok(ContactRecord::new(name, email, phone))
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(&PatternConfig::default()).expect("default patterns are valid regexes")
    }
}
