//! Data ingestion and validation for the TRACE cleaner.
//!
//! This crate handles:
//! - Schema validation of raw feed rows
//! - CSV and JSON-lines readers
//! - The immutable message store and its per-cusip partitioning

pub mod schema;
pub mod reader;
pub mod store;

pub use schema::{RawTradeMessage, MISSING_MARKERS, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
pub use store::MessageStore;
