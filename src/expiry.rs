//! Expiry extraction and the Valid/Expired decision.
//!
//! Timestamps are always handled and printed in UTC so the output does not
//! depend on the host's time zone.

use chrono::{DateTime, Utc};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::x509::X509Ref;

use crate::outcome::Status;

/// Format used for every printed expiry timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads a certificate's `NotAfter` as a UTC timestamp.
pub fn not_after(cert: &X509Ref) -> Result<DateTime<Utc>, String> {
    asn1_to_utc(cert.not_after())
}

fn asn1_to_utc(time: &Asn1TimeRef) -> Result<DateTime<Utc>, String> {
    let epoch = Asn1Time::from_unix(0).map_err(|e| e.to_string())?;
    let diff = epoch.diff(time).map_err(|e| e.to_string())?;
    let secs = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("timestamp {} is out of range", time))
}

/// Decides whether a certificate expiring at `not_after` has expired at `now`.
///
/// Only a `not_after` strictly before `now` is expired; a certificate whose
/// last valid second is `now` is still valid.
pub fn classify(not_after: DateTime<Utc>, now: DateTime<Utc>) -> Status {
    if not_after < now {
        Status::Expired
    } else {
        Status::Valid
    }
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}
