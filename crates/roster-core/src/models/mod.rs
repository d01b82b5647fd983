//! Data models shared across the pipeline.

pub mod config;
pub mod contact;

pub use config::{ExtractionConfig, OutputConfig, PatternConfig, PdfLayout, RosterConfig};
pub use contact::{COLUMNS, ContactRecord};
