//! Contact line parsing, field validation and deduplication.

mod dedup;
mod parser;
pub mod patterns;
mod validator;

pub use dedup::{Deduplicator, deduplicate};
pub use parser::{ParseOutcome, RecordParser, RejectReason, RejectedLine};
pub use validator::FieldValidator;
