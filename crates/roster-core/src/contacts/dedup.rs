//! Order-preserving removal of duplicate contacts.

use std::collections::HashSet;

use tracing::debug;

use crate::models::contact::ContactRecord;

/// Keeps the first occurrence of each structurally distinct record.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<ContactRecord>,
    records: Vec<ContactRecord>,
    duplicates: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` if an equal record was already added.
    pub fn push(&mut self, record: ContactRecord) -> bool {
        if self.seen.contains(&record) {
            self.duplicates += 1;
            return false;
        }
        self.seen.insert(record.clone());
        self.records.push(record);
        true
    }

    /// Number of duplicates dropped so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique records in first-seen order.
    pub fn into_records(self) -> Vec<ContactRecord> {
        self.records
    }
}

impl Extend<ContactRecord> for Deduplicator {
    fn extend<I: IntoIterator<Item = ContactRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Reduce `records` to one entry per distinct contact, keeping input order.
pub fn deduplicate<I>(records: I) -> Vec<ContactRecord>
where
    I: IntoIterator<Item = ContactRecord>,
{
    let mut dedup = Deduplicator::new();
    dedup.extend(records);
    debug!(
        "Deduplicated contacts: {} unique, {} duplicates removed",
        dedup.len(),
        dedup.duplicates()
    );
    dedup.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(name: &str, email: &str, phone: &str) -> ContactRecord {
        ContactRecord::new(name, email, phone)
    }

    #[test]
    fn test_keeps_first_occurrence_order() {
        let input = vec![
            record("Bob", "bob@x.com", "9876543211"),
            record("Ann", "ann@x.com", "9876543210"),
            record("Bob", "bob@x.com", "9876543211"),
            record("Cat", "cat@x.com", "9876543212"),
            record("Ann", "ann@x.com", "9876543210"),
        ];

        let unique = deduplicate(input);
        let names: Vec<&str> = unique.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Bob", "Ann", "Cat"]);
    }

    #[test]
    fn test_any_field_difference_is_distinct() {
        let input = vec![
            record("Ann", "ann@x.com", "9876543210"),
            record("Ann", "ann@y.com", "9876543210"),
            record("Ann", "ann@x.com", "9876543219"),
            record("ann", "ann@x.com", "9876543210"),
        ];
        assert_eq!(deduplicate(input).len(), 4);
    }

    #[test]
    fn test_idempotent() {
        let input = vec![
            record("Ann", "ann@x.com", "9876543210"),
            record("Ann", "ann@x.com", "9876543210"),
            record("Bob", "bob@x.com", "9876543211"),
        ];

        let once = deduplicate(input);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_counts_duplicates() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.push(record("Ann", "ann@x.com", "9876543210")));
        assert!(!dedup.push(record("Ann", "ann@x.com", "9876543210")));
        assert_eq!(dedup.len(), 1);
        assert_eq!(dedup.duplicates(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate(Vec::new()).is_empty());
    }
}
