//! Loading of client-auth material and extra trust anchors from PEM files.
//!
//! Everything here runs before any network I/O, so a bad path or a
//! mismatched key pair is reported without dialling the target.

use std::fs;
use std::path::{Path, PathBuf};

use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use tracing::debug;

use crate::error::CheckError;

/// Client certificate and private key presented during a mutual-TLS handshake.
pub struct ClientIdentity {
    pub certificate: X509,
    /// Intermediates that followed the leaf in the certificate file
    pub chain: Vec<X509>,
    pub key: PKey<Private>,
}

impl ClientIdentity {
    /// Loads a client identity when both paths are given.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - neither path was supplied
    /// * `Ok(Some(identity))` - the pair loaded and the key matches the certificate
    /// * `Err(CheckError::CredentialLoadFailed)` - only one path was supplied,
    ///   a file could not be read or parsed, or the key does not match
    pub fn load(
        cert: Option<&Path>,
        key: Option<&Path>,
    ) -> Result<Option<ClientIdentity>, CheckError> {
        let (cert_path, key_path) = match (cert, key) {
            (None, None) => return Ok(None),
            (Some(cert), Some(key)) => (cert, key),
            (Some(_), None) => {
                return Err(CheckError::credential(
                    None,
                    "--cert was given without --key; both must be supplied together",
                ))
            }
            (None, Some(_)) => {
                return Err(CheckError::credential(
                    None,
                    "--key was given without --cert; both must be supplied together",
                ))
            }
        };

        let mut certs = read_certificates(cert_path)?.into_iter();
        let certificate = certs
            .next()
            .ok_or_else(|| credential_error(cert_path, "no certificate found"))?;
        let chain: Vec<X509> = certs.collect();

        let key_pem = read_file(key_path)?;
        let key = PKey::private_key_from_pem(&key_pem)
            .map_err(|e| credential_error(key_path, e))?;

        let public = certificate
            .public_key()
            .map_err(|e| credential_error(cert_path, e))?;
        if !public.public_eq(&key) {
            return Err(credential_error(
                key_path,
                "private key does not match the client certificate",
            ));
        }

        debug!(
            cert = %cert_path.display(),
            intermediates = chain.len(),
            "loaded client identity"
        );
        Ok(Some(ClientIdentity {
            certificate,
            chain,
            key,
        }))
    }
}

/// CA certificates added to the default trust store.
pub struct TrustBundle {
    pub certificates: Vec<X509>,
}

impl TrustBundle {
    pub fn load(path: &Path) -> Result<TrustBundle, CheckError> {
        let certificates = read_certificates(path)?;
        if certificates.is_empty() {
            return Err(credential_error(path, "no certificates found"));
        }
        debug!(ca = %path.display(), count = certificates.len(), "loaded trust bundle");
        Ok(TrustBundle { certificates })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CheckError> {
    fs::read(path).map_err(|e| credential_error(path, e))
}

fn read_certificates(path: &Path) -> Result<Vec<X509>, CheckError> {
    let pem = read_file(path)?;
    X509::stack_from_pem(&pem).map_err(|e| credential_error(path, e))
}

fn credential_error(path: &Path, reason: impl std::fmt::Display) -> CheckError {
    CheckError::credential(Some(PathBuf::from(path)), reason)
}
