// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types for astrowatch.
//!
//! [`Error`] is what public operations return. [`TierError`] is the soft
//! failure of a single precision tier; it only leaves the service aggregated
//! inside [`Error::AllTiersFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type for astrowatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the core.
#[derive(Error, Debug)]
pub enum Error {
    /// Naive/ambiguous timestamp, out-of-range inverse-mapping argument or
    /// malformed configuration value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The apparent solar longitude did not change sign inside the widened
    /// March window.
    #[error("No sign change of apparent solar longitude found around March 20 of {year}")]
    NoSignChangeFound { year: i32 },

    /// Every precision tier in the preference order failed.
    #[error("All methods failed for year {year}. Errors: {}", .reasons.join("; "))]
    AllTiersFailed { year: i32, reasons: Vec<String> },

    /// A coefficient table could not be read or parsed.
    #[error("Coefficient table {}: {reason}", .path.display())]
    CoefficientTable { path: PathBuf, reason: String },

    /// I/O error (cache file, coefficient directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Why a precision tier did not produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TierError {
    /// The tier has no source configured (network tier without URL).
    #[error("not configured")]
    NotConfigured,

    /// Connection, timeout or body read failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    Http(u16),

    /// Payload was not the expected JSON shape or timestamp.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Value parsed but failed a sanity or validation gate.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The analytic solver could not produce an instant.
    #[error("solver failed: {0}")]
    Solver(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tiers_failed_lists_every_reason() {
        let err = Error::AllTiersFailed {
            year: 2025,
            reasons: vec![
                "internet: not configured".into(),
                "analytic: solver failed: boom".into(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2025"));
        assert!(msg.contains("internet: not configured"));
        assert!(msg.contains("analytic: solver failed: boom"));
    }

    #[test]
    fn tier_error_display() {
        assert_eq!(TierError::Http(503).to_string(), "HTTP status 503");
        assert_eq!(TierError::NotConfigured.to_string(), "not configured");
    }
}
