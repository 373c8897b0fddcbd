//! Error types for the sync engine.

use thiserror::Error;

/// Errors that abort a sync run.
///
/// Per-action failures (a rejected create or modify) are never raised as
/// errors; they are reported through [`crate::ApplyResult::Failed`].
#[derive(Debug, Error)]
pub enum Error {
    /// The run was interrupted between two records.
    #[error("interrupted")]
    Interrupted,

    /// The HR provider failed; the roster cannot be trusted.
    #[error("HR provider error: {0:#}")]
    Hr(anyhow::Error),

    /// The directory provider failed while taking a snapshot.
    #[error("directory provider error: {0:#}")]
    Directory(anyhow::Error),

    /// A date field did not match `YYYY-MM-DD`.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The raw value received from the HR system
        value: String,
    },
}

impl Error {
    /// Whether this error came from a user interrupt.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted() {
        assert!(Error::Interrupted.is_interrupted());
        assert!(!Error::Hr(anyhow::anyhow!("boom")).is_interrupted());
    }

    #[test]
    fn test_display_includes_cause_chain() {
        let err = Error::Hr(anyhow::anyhow!("timed out").context("fetching roster"));
        let display = err.to_string();
        assert!(display.contains("fetching roster"));
        assert!(display.contains("timed out"));
    }
}
