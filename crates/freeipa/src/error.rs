//! Error types for FreeIPA directory operations.
//!
//! Errors are categorized so the caller can tell a rejected bind from an
//! unreachable server and give appropriate feedback.

use thiserror::Error;

/// Categories of directory errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Server unreachable or connection dropped (transient)
    Network,
    /// Bind DN or password rejected
    Authentication,
    /// Entry or base DN does not exist
    NotFound,
    /// Server answered with an unexpected result
    InvalidResponse,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Directory server unreachable",
            Self::Authentication => "Directory authentication failed",
            Self::NotFound => "Directory entry not found",
            Self::InvalidResponse => "Unexpected directory response",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check ipa_server and that the LDAP port is reachable",
            Self::Authentication => "Check bind_dn and bind_pw in the configuration file",
            Self::NotFound => "Check ipa_domain matches the directory suffix",
            Self::InvalidResponse => "Check the directory server logs for details",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// LDAP result code for invalid credentials
pub const RC_INVALID_CREDENTIALS: u32 = 49;
/// LDAP result code for a missing entry
pub const RC_NO_SUCH_OBJECT: u32 = 32;

/// Errors that can occur talking to the directory.
#[derive(Debug, Error)]
pub enum Error {
    /// No directory server configured
    #[error("no directory server configured")]
    NoServers,

    /// Could not connect to a server
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// LDAP URL tried
        url: String,
        #[source]
        source: ldap3::LdapError,
    },

    /// Bind rejected by the server
    #[error("bind as {dn} failed with code {rc}: {text}")]
    Bind {
        /// Bind DN
        dn: String,
        /// LDAP result code
        rc: u32,
        /// Diagnostic message from the server
        text: String,
    },

    /// An operation returned a non-success result code
    #[error("{operation} of {dn} failed with code {rc}: {text}")]
    Operation {
        /// Operation name (search, add, modify)
        operation: &'static str,
        /// Target DN
        dn: String,
        /// LDAP result code
        rc: u32,
        /// Diagnostic message from the server
        text: String,
    },

    /// Protocol or transport failure during an operation
    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),

    /// Every configured server failed
    #[error("could not bind to any directory server (last error: {last})")]
    AllServersFailed {
        /// Error from the last server tried
        last: Box<Error>,
    },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoServers => ErrorCategory::Other,
            Self::Connect { .. } | Self::Ldap(_) => ErrorCategory::Network,
            Self::Bind { rc, .. } if *rc == RC_INVALID_CREDENTIALS => ErrorCategory::Authentication,
            Self::Bind { .. } => ErrorCategory::InvalidResponse,
            Self::Operation { rc, .. } if *rc == RC_NO_SUCH_OBJECT => ErrorCategory::NotFound,
            Self::Operation { .. } => ErrorCategory::InvalidResponse,
            Self::AllServersFailed { last } => last.category(),
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn bind_error(rc: u32) -> Error {
        Error::Bind {
            dn: "cn=Directory Manager".to_string(),
            rc,
            text: String::new(),
        }
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(!ErrorCategory::Authentication.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Other.is_retryable());
    }

    #[test]
    fn test_bind_category() {
        assert_eq!(bind_error(49).category(), ErrorCategory::Authentication);
        assert_eq!(bind_error(53).category(), ErrorCategory::InvalidResponse);
    }

    #[test]
    fn test_all_servers_failed_keeps_last_category() {
        let err = Error::AllServersFailed {
            last: Box::new(bind_error(49)),
        };
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert!(err.to_string().contains("code 49"));
    }

    #[test]
    fn test_operation_display() {
        let err = Error::Operation {
            operation: "modify",
            dn: "uid=bob,cn=users".to_string(),
            rc: 32,
            text: "no such object".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(
            err.to_string(),
            "modify of uid=bob,cn=users failed with code 32: no such object"
        );
    }

    #[test]
    fn test_advice_names_config_keys() {
        assert!(ErrorCategory::Authentication.advice().contains("bind_pw"));
        assert!(ErrorCategory::Network.advice().contains("ipa_server"));
    }
}
