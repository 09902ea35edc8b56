//! Reports whether a TLS endpoint's leaf certificate is valid, expired or
//! untrusted.
//!
//! [`check`] performs a single handshake and classifies the result into an
//! [`Outcome`], whose [`Status`] maps onto a process exit code.
//!
//! ```no_run
//! use getcertexpiry::{check, CheckRequest, Status};
//!
//! let outcome = check(&CheckRequest::new("example.com:443"));
//! if outcome.status == Status::Valid {
//!     println!("expires {}", outcome.report_line());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod expiry;
pub mod logging;
pub mod outcome;
pub mod target;
pub mod tls;
pub mod verify;

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use credentials::{ClientIdentity, TrustBundle};
pub use error::CheckError;
pub use outcome::{Outcome, Status};
pub use target::Target;
pub use verify::VerifyFailure;

/// Everything one check needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRequest {
    /// `host:port` to dial
    pub target: String,
    /// Client certificate, supplied together with `key`
    pub cert: Option<PathBuf>,
    /// Client private key, supplied together with `cert`
    pub key: Option<PathBuf>,
    /// CA bundle added to the default trust store
    pub ca: Option<PathBuf>,
    /// Skip chain and hostname verification
    pub insecure: bool,
    pub timeout: Duration,
}

impl CheckRequest {
    pub fn new(target: impl Into<String>) -> Self {
        CheckRequest {
            target: target.into(),
            cert: None,
            key: None,
            ca: None,
            insecure: false,
            timeout: tls::DEFAULT_TIMEOUT,
        }
    }
}

/// Checks the certificate served at `request.target`.
///
/// Argument and credential problems are reported before any connection is
/// attempted. Failures are never retried.
pub fn check(request: &CheckRequest) -> Outcome {
    match run_check(request) {
        Ok(outcome) => {
            info!(status = %outcome.status, expiry = outcome.report_line(), "check finished");
            outcome
        }
        Err(err) => {
            info!(error = %err, "check failed");
            Outcome::from(err)
        }
    }
}

fn run_check(request: &CheckRequest) -> Result<Outcome, CheckError> {
    let target = Target::parse(&request.target)?;

    let identity = ClientIdentity::load(request.cert.as_deref(), request.key.as_deref())?;
    let trust = request.ca.as_deref().map(TrustBundle::load).transpose()?;

    let connector = tls::build_connector(identity.as_ref(), trust.as_ref(), request.insecure)?;
    let leaf = tls::fetch_leaf_certificate(&connector, &target, request.insecure, request.timeout)?;

    let not_after = expiry::not_after(&leaf).map_err(|e| {
        CheckError::handshake(
            target.to_string(),
            format!("couldn't read certificate expiry: {}", e),
        )
    })?;
    let status = expiry::classify(not_after, Utc::now());
    Ok(Outcome::certificate(status, expiry::format_timestamp(not_after)))
}
