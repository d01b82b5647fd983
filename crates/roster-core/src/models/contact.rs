//! The contact record produced by the extraction pipeline.

/// Column headers, in field order, shared by every output format.
pub const COLUMNS: [&str; 3] = ["Name", "Email", "Phone"];

/// A validated contact taken from a single `Name, Email, Phone` line.
///
/// Records are immutable once built. Equality and hashing are structural
/// over the three trimmed fields, which is what deduplication relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactRecord {
    name: String,
    email: String,
    phone: String,
}

impl ContactRecord {
    /// Build a record from already trimmed, validated fields.
    pub(crate) fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number as written in the source document (whitespace kept).
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Fields in [`COLUMNS`] order.
    pub fn fields(&self) -> [&str; 3] {
        [&self.name, &self.email, &self.phone]
    }
}
