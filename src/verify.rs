//! Structured classification of OpenSSL certificate verification failures.
//!
//! OpenSSL reports why a chain was rejected as a numeric `X509_V_ERR_*` code.
//! [`VerifyFailure`] folds those codes into the handful of cases the checker
//! branches on, so callers match on a tag instead of an error string.

use std::fmt;

use openssl::x509::X509VerifyResult;

const X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT: i32 = 2;
const X509_V_ERR_CERT_NOT_YET_VALID: i32 = 9;
const X509_V_ERR_CERT_HAS_EXPIRED: i32 = 10;
const X509_V_ERR_DEPTH_ZERO_SELF_SIGNED_CERT: i32 = 18;
const X509_V_ERR_SELF_SIGNED_CERT_IN_CHAIN: i32 = 19;
const X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT_LOCALLY: i32 = 20;
const X509_V_ERR_UNABLE_TO_VERIFY_LEAF_SIGNATURE: i32 = 21;
const X509_V_ERR_HOSTNAME_MISMATCH: i32 = 62;
const X509_V_ERR_IP_ADDRESS_MISMATCH: i32 = 64;

/// Why OpenSSL refused to verify the peer's certificate chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyFailure {
    /// A certificate's `NotAfter` is in the past
    Expired,
    /// A certificate's `NotBefore` is in the future
    NotYetValid,
    /// No trusted issuer could be found for some certificate in the chain
    UnknownAuthority,
    /// The chain ends in a self-signed certificate that is not a trust anchor
    SelfSigned,
    /// The leaf does not cover the requested host name or IP address
    HostnameMismatch,
    /// Any other verification error
    Other {
        /// Raw `X509_V_ERR_*` code
        code: i32,
        /// OpenSSL's description of the code
        reason: String,
    },
}

impl VerifyFailure {
    /// Classifies an OpenSSL verification result.
    ///
    /// Returns `None` when the result is `X509_V_OK`, i.e. verification did
    /// not fail (or was never performed).
    pub fn from_result(result: X509VerifyResult) -> Option<Self> {
        if result == X509VerifyResult::OK {
            return None;
        }
        Some(Self::from_code(result.as_raw(), result.error_string()))
    }

    fn from_code(code: i32, reason: &str) -> Self {
        match code {
            X509_V_ERR_CERT_HAS_EXPIRED => Self::Expired,
            X509_V_ERR_CERT_NOT_YET_VALID => Self::NotYetValid,
            X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT
            | X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT_LOCALLY
            | X509_V_ERR_UNABLE_TO_VERIFY_LEAF_SIGNATURE => Self::UnknownAuthority,
            X509_V_ERR_DEPTH_ZERO_SELF_SIGNED_CERT | X509_V_ERR_SELF_SIGNED_CERT_IN_CHAIN => {
                Self::SelfSigned
            }
            X509_V_ERR_HOSTNAME_MISMATCH | X509_V_ERR_IP_ADDRESS_MISMATCH => Self::HostnameMismatch,
            _ => Self::Other {
                code,
                reason: reason.to_string(),
            },
        }
    }

    /// True when the failure means the chain does not lead to a trusted root.
    pub fn is_untrusted_chain(&self) -> bool {
        matches!(self, Self::UnknownAuthority | Self::SelfSigned)
    }

    /// True for an expired leaf, which the checker reports through the
    /// timestamp rather than as a handshake failure.
    pub(crate) fn is_tolerated_at_leaf(code: i32) -> bool {
        code == X509_V_ERR_CERT_HAS_EXPIRED
    }
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "certificate has expired"),
            Self::NotYetValid => write!(f, "certificate is not yet valid"),
            Self::UnknownAuthority => write!(f, "certificate signed by unknown authority"),
            Self::SelfSigned => write!(f, "self-signed certificate is not trusted"),
            Self::HostnameMismatch => write!(f, "certificate does not match the host"),
            Self::Other { code, reason } => write!(f, "{} (code {})", reason, code),
        }
    }
}
