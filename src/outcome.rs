//! Outcome of a check and the exit-code contract.

use strum_macros::{Display, EnumIter};

use crate::error::CheckError;

/// Classification of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Valid,
    Expired,
    ArgumentsInvalid,
    HandshakeFailed,
    UntrustedChain,
    CredentialLoadFailed,
}

impl Status {
    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Valid => 0,
            Status::Expired => 1,
            Status::ArgumentsInvalid => 2,
            Status::HandshakeFailed => 3,
            Status::UntrustedChain => 4,
            Status::CredentialLoadFailed => 5,
        }
    }
}

/// What a check reports: a status, the expiry timestamp for `Valid` and
/// `Expired`, and a diagnostic message for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub expiry: Option<String>,
    pub message: Option<String>,
}

impl Outcome {
    pub fn certificate(status: Status, expiry: String) -> Outcome {
        Outcome {
            status,
            expiry: Some(expiry),
            message: None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    /// The single line printed on stdout.
    pub fn report_line(&self) -> &str {
        self.expiry
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or_default()
    }
}

impl From<CheckError> for Outcome {
    fn from(err: CheckError) -> Self {
        let status = match err {
            CheckError::ArgumentsInvalid { .. } => Status::ArgumentsInvalid,
            CheckError::CredentialLoadFailed { .. } => Status::CredentialLoadFailed,
            CheckError::HandshakeFailed { .. } => Status::HandshakeFailed,
            CheckError::UntrustedChain { .. } => Status::UntrustedChain,
        };
        Outcome {
            status,
            expiry: None,
            message: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes: HashSet<i32> = Status::iter().map(Status::exit_code).collect();
        assert_eq!(codes.len(), Status::iter().count());
    }

    #[test]
    fn test_exit_code_contract() {
        assert_eq!(Status::Valid.exit_code(), 0);
        assert_eq!(Status::Expired.exit_code(), 1);
        assert_eq!(Status::ArgumentsInvalid.exit_code(), 2);
        assert_eq!(Status::HandshakeFailed.exit_code(), 3);
        assert_eq!(Status::UntrustedChain.exit_code(), 4);
        assert_eq!(Status::CredentialLoadFailed.exit_code(), 5);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::UntrustedChain.to_string(), "untrusted_chain");
    }

    #[test]
    fn test_error_outcome_has_message_and_no_expiry() {
        let outcome = Outcome::from(CheckError::handshake("127.0.0.1:1", "connection refused"));
        assert_eq!(outcome.status, Status::HandshakeFailed);
        assert_eq!(outcome.expiry, None);
        assert_eq!(
            outcome.report_line(),
            "TLS handshake with 127.0.0.1:1 failed: connection refused"
        );
    }

    #[test]
    fn test_certificate_outcome_reports_timestamp() {
        let outcome = Outcome::certificate(Status::Valid, "2099-01-01 00:00:00".to_string());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.report_line(), "2099-01-01 00:00:00");
    }
}
