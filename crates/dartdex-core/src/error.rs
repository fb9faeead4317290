//! Typed errors for record lookup and post-processing.
//!
//! Uses `thiserror` so callers can match on the failure kind: the HTTP layer
//! maps [`LookupError::PathNotFound`] and [`LookupError::NotFound`] to 404,
//! invalid input to 400, and so on.

use std::path::PathBuf;

use thiserror::Error;

use crate::period::Period;

/// Errors that can occur while resolving, loading, or processing a record.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The query string was empty or otherwise unusable.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Year or quarter outside the accepted range.
    #[error("invalid period: {reason}")]
    InvalidPeriod { reason: String },

    /// The directory for the requested period does not exist.
    #[error("no data directory for {period}: {}", path.display())]
    PathNotFound { period: Period, path: PathBuf },

    /// A record document lacks a required top-level key.
    #[error("record is missing required key '{key}'")]
    MissingData { key: String },

    /// No company name cleared any matching tier.
    #[error("{}", not_found_message(query, period))]
    NotFound {
        query: String,
        period: Option<Period>,
    },

    /// Reading a listing or record failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record file is not valid JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn not_found_message(query: &str, period: &Option<Period>) -> String {
    match period {
        Some(p) => format!("no record found for '{}' in {}", query, p),
        None => format!("no record found for '{}' in any period", query),
    }
}

impl LookupError {
    pub fn not_found(query: impl Into<String>, period: Option<Period>) -> Self {
        LookupError::NotFound {
            query: query.into(),
            period,
        }
    }

    /// True for the "nothing there" family: missing period or no match.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LookupError::NotFound { .. } | LookupError::PathNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
