//! Error types for the TRACE cleaner.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the TRACE cleaner.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input row is missing a required column or carries an out-of-domain value.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Correction chains did not converge within the pass cap.
    #[error(
        "Data integrity error: correction fixpoint exceeded {passes} passes with {} unresolved corrections: [{}]",
        .unresolved.len(),
        .unresolved.join(", ")
    )]
    DataIntegrity {
        /// Passes executed before giving up.
        passes: usize,
        /// Message keys of the corrections still pending.
        unresolved: Vec<String>,
    },

    /// A cancellation, correction or reversal key matched more than one target.
    #[error("Ambiguous match in {stage}: key {key} matches {candidates} messages")]
    AmbiguousMatch {
        /// Cleaning stage that detected the ambiguity.
        stage: &'static str,
        /// Rendered key.
        key: String,
        /// Number of candidate targets.
        candidates: usize,
    },

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a schema error pinned to an input row and column.
    pub fn schema_at(row: usize, column: &str, msg: impl std::fmt::Display) -> Self {
        Error::Schema(format!("row {row}, column `{column}`: {msg}"))
    }

    /// Create an ambiguous match error.
    pub fn ambiguous(stage: &'static str, key: impl std::fmt::Debug, candidates: usize) -> Self {
        Error::AmbiguousMatch {
            stage,
            key: format!("{key:?}"),
            candidates,
        }
    }

    /// Create a CSV error.
    pub fn csv(msg: impl Into<String>) -> Self {
        Error::Csv(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_integrity_lists_unresolved() {
        let err = Error::DataIntegrity {
            passes: 2,
            unresolved: vec!["A/2012-01-03/7".to_string(), "A/2012-01-03/9".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 unresolved"));
        assert!(msg.contains("A/2012-01-03/7, A/2012-01-03/9"));
    }

    #[test]
    fn test_schema_at_names_row_and_column() {
        let err = Error::schema_at(4, "trc_st", "unknown code `Q`");
        assert_eq!(
            err.to_string(),
            "Schema error: row 4, column `trc_st`: unknown code `Q`"
        );
    }
}
