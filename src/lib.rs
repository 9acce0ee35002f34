//! Pulls headline figures out of the statement tables of periodic filings.
//!
//! A statement page is read row by row: the first rows are checked for a
//! unit disclosure, each row label is matched against an ordered keyword
//! table, and the first usable value cell is normalized into the requested
//! record. Reading stops as soon as every required attribute is known.

pub mod core;
pub mod edgar;
pub mod error;

// Re-exports
pub use crate::core::config::ExtractorConfig;
pub use edgar::{extract, Extractor, FieldType, FinancialRecord, StatementKind};
pub use error::{ExtractError, Result};
