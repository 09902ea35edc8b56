//! Error types for certificate expiry checks.
//!
//! Every variant is terminal for an invocation: nothing is retried, and each
//! one maps onto exactly one [`Status`](crate::outcome::Status).

use std::fmt;
use std::path::PathBuf;

use crate::verify::VerifyFailure;

/// Error returned when a check cannot produce a certificate expiry.
#[derive(Debug)]
pub enum CheckError {
    /// The target or another argument was missing or malformed
    ArgumentsInvalid {
        /// Why the arguments were rejected
        reason: String,
    },

    /// Client certificate, private key or CA bundle could not be loaded
    CredentialLoadFailed {
        /// The offending file, when one is known
        path: Option<PathBuf>,
        /// The underlying I/O or parse error
        reason: String,
    },

    /// DNS, TCP or TLS handshake failure
    HandshakeFailed {
        /// The `host:port` that was dialled
        address: String,
        /// Details about why the connection failed
        details: String,
    },

    /// The peer's chain was not signed by a trusted authority
    UntrustedChain {
        /// The `host:port` that was dialled
        address: String,
        /// The verification failure reported by OpenSSL
        failure: VerifyFailure,
    },
}

impl CheckError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::ArgumentsInvalid {
            reason: reason.into(),
        }
    }

    pub(crate) fn credential(path: Option<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::CredentialLoadFailed {
            path,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn handshake(address: impl Into<String>, details: impl fmt::Display) -> Self {
        Self::HandshakeFailed {
            address: address.into(),
            details: details.to_string(),
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentsInvalid { reason } => {
                write!(f, "Invalid arguments: {}", reason)
            }
            Self::CredentialLoadFailed {
                path: Some(path),
                reason,
            } => {
                write!(
                    f,
                    "Failed to load credentials from {}: {}",
                    path.display(),
                    reason
                )
            }
            Self::CredentialLoadFailed { path: None, reason } => {
                write!(f, "Failed to load credentials: {}", reason)
            }
            Self::HandshakeFailed { address, details } => {
                write!(f, "TLS handshake with {} failed: {}", address, details)
            }
            Self::UntrustedChain { address, failure } => {
                write!(
                    f,
                    "Certificate chain presented by {} is not trusted: {}",
                    address, failure
                )
            }
        }
    }
}

impl std::error::Error for CheckError {}
