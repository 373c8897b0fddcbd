//! Error types for BambooHR API operations.
//!
//! Errors are categorized so callers can tell a bad API key from a network
//! outage and give appropriate feedback.

use std::fmt;

/// Result type alias for BambooHR operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of BambooHR errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient, retryable).
    Network,
    /// The API key was rejected.
    Authentication,
    /// Employee or endpoint not found.
    NotFound,
    /// The API answered with something we cannot read.
    InvalidResponse,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Authentication => "BambooHR authentication failed",
            Self::NotFound => "BambooHR resource not found",
            Self::InvalidResponse => "Unexpected BambooHR response",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your connection to BambooHR and try again",
            Self::Authentication => "Check bamboo_api_key in the configuration file",
            Self::NotFound => "Check bamboo_url in the configuration file",
            Self::InvalidResponse => "Check bamboo_url points at the v1 employees API",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur talking to BambooHR.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("failed to fetch BambooHR data: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The API key was rejected (HTTP 401/403).
    #[error("BambooHR rejected the API key (HTTP {status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// Employee identifier unknown to BambooHR.
    #[error("employee {0} not found in BambooHR")]
    EmployeeNotFound(String),

    /// Employee identifier that cannot be placed in a URL.
    #[error("invalid employee id '{0}'")]
    InvalidEmployeeId(String),

    /// The directory listing held no employees.
    #[error("BambooHR data set is empty")]
    EmptyRoster,

    /// Invalid response from the API.
    #[error("invalid BambooHR response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { .. } => ErrorCategory::Network,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::EmployeeNotFound(_) => ErrorCategory::NotFound,
            Self::InvalidEmployeeId(_) => ErrorCategory::Other,
            Self::EmptyRoster | Self::InvalidResponse(_) => ErrorCategory::InvalidResponse,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status @ (401 | 403)) => Self::Unauthorized { status },
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP error code {code}"),
                status: Some(code),
            },
            ureq::Error::Json(e) => Self::InvalidResponse(e.to_string()),
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Authentication.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::InvalidResponse.is_retryable());
        assert!(!ErrorCategory::Other.is_retryable());
    }

    #[test]
    fn test_error_category_advice() {
        assert!(ErrorCategory::Authentication.advice().contains("bamboo_api_key"));
        assert!(!ErrorCategory::Network.advice().is_empty());
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Network);
        assert!(display.contains("Network"));
    }

    #[test]
    fn test_from_status_code() {
        let err: Error = ureq::Error::StatusCode(401).into();
        assert!(matches!(err, Error::Unauthorized { status: 401 }));
        assert_eq!(err.category(), ErrorCategory::Authentication);

        let err: Error = ureq::Error::StatusCode(503).into();
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.category(), ErrorCategory::InvalidResponse);
    }

    #[test]
    fn test_empty_roster_display() {
        assert_eq!(Error::EmptyRoster.to_string(), "BambooHR data set is empty");
        assert!(!Error::EmptyRoster.is_retryable());
    }
}
