//! TLS client plumbing: connector configuration, dialling and the handshake.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use openssl::error::ErrorStack;
use openssl::ssl::{HandshakeError, SslConnector, SslMethod, SslStream, SslVerifyMode};
use openssl::x509::{X509VerifyResult, X509};
use tracing::{debug, info};

use crate::credentials::{ClientIdentity, TrustBundle};
use crate::error::CheckError;
use crate::target::Target;
use crate::verify::VerifyFailure;

/// Default connect, read and write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the client connector.
///
/// A trust bundle is added on top of OpenSSL's default verify paths. With
/// `insecure` set, chain and hostname verification are disabled; otherwise
/// an expired leaf is let through so the caller can report it as `Expired`.
pub fn build_connector(
    identity: Option<&ClientIdentity>,
    trust: Option<&TrustBundle>,
    insecure: bool,
) -> Result<SslConnector, CheckError> {
    let mut builder = SslConnector::builder(SslMethod::tls_client())
        .map_err(|e| CheckError::handshake("client context", e))?;

    if let Some(identity) = identity {
        builder
            .set_certificate(&identity.certificate)
            .map_err(identity_error)?;
        for intermediate in &identity.chain {
            builder
                .add_extra_chain_cert(intermediate.clone())
                .map_err(identity_error)?;
        }
        builder.set_private_key(&identity.key).map_err(identity_error)?;
        builder
            .check_private_key()
            .map_err(|e| CheckError::credential(None, e))?;
    }

    if let Some(trust) = trust {
        for ca in &trust.certificates {
            builder
                .cert_store_mut()
                .add_cert(ca.clone())
                .map_err(|e| CheckError::credential(None, e))?;
        }
    }

    if insecure {
        builder.set_verify(SslVerifyMode::NONE);
    } else {
        builder.set_verify_callback(SslVerifyMode::PEER, |preverify_ok, ctx| {
            if preverify_ok {
                return true;
            }
            let code = ctx.error().as_raw();
            let tolerated = ctx.error_depth() == 0 && VerifyFailure::is_tolerated_at_leaf(code);
            if tolerated {
                debug!("leaf certificate has expired, continuing handshake");
                // Keep a later, unrelated failure from being reported as expiry.
                ctx.set_error(X509VerifyResult::OK);
            }
            tolerated
        });
    }

    Ok(builder.build())
}

/// Dials `target`, completes the handshake and returns the peer's leaf.
///
/// One TCP connection is opened, to the first resolved address. It is closed
/// before this returns, whatever the result.
pub fn fetch_leaf_certificate(
    connector: &SslConnector,
    target: &Target,
    insecure: bool,
    timeout: Duration,
) -> Result<X509, CheckError> {
    let address = target.to_string();

    let socket_addr = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|e| {
            CheckError::handshake(&address, format!("couldn't resolve host address: {}", e))
        })?
        .next()
        .ok_or_else(|| CheckError::handshake(&address, "host resolved to no addresses"))?;

    debug!(%address, %socket_addr, ?timeout, "connecting");
    let tcp_stream = TcpStream::connect_timeout(&socket_addr, timeout)
        .map_err(|e| CheckError::handshake(&address, describe_io(&e)))?;
    tcp_stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| tcp_stream.set_write_timeout(Some(timeout)))
        .map_err(|e| CheckError::handshake(&address, e))?;

    let mut stream = connector
        .configure()
        .map_err(|e| CheckError::handshake(&address, e))?
        .verify_hostname(!insecure)
        .use_server_name_indication(true)
        .connect(&target.host, tcp_stream)
        .map_err(|e| classify_handshake_error(&address, insecure, e))?;

    info!(
        %address,
        version = stream.ssl().version_str(),
        cipher = stream.ssl().current_cipher().map(|c| c.name()).unwrap_or("unknown"),
        "handshake complete"
    );

    let leaf = stream.ssl().peer_certificate();
    close(&mut stream);
    leaf.ok_or_else(|| CheckError::handshake(&address, "peer presented no certificate"))
}

fn identity_error(err: ErrorStack) -> CheckError {
    CheckError::credential(None, err)
}

fn close(stream: &mut SslStream<TcpStream>) {
    // Best effort: the socket is dropped with the stream either way.
    if let Err(e) = stream.shutdown() {
        debug!("TLS shutdown failed: {}", e);
    }
}

fn classify_handshake_error(
    address: &str,
    insecure: bool,
    err: HandshakeError<TcpStream>,
) -> CheckError {
    match err {
        HandshakeError::SetupFailure(stack) => CheckError::handshake(address, stack),
        HandshakeError::Failure(mid) => {
            // Without verification the stored result never caused the failure.
            let failure = if insecure {
                None
            } else {
                VerifyFailure::from_result(mid.ssl().verify_result())
            };
            match failure {
                Some(failure) if failure.is_untrusted_chain() => CheckError::UntrustedChain {
                    address: address.to_string(),
                    failure,
                },
                Some(failure) => CheckError::handshake(address, failure),
                None => CheckError::handshake(address, describe_ssl_error(mid.error())),
            }
        }
        HandshakeError::WouldBlock(_) => CheckError::handshake(address, "handshake timed out"),
    }
}

fn describe_ssl_error(err: &openssl::ssl::Error) -> String {
    match err.io_error() {
        Some(io_err) => describe_io(io_err),
        None => err.to_string(),
    }
}

fn describe_io(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => "operation timed out".to_string(),
        _ => err.to_string(),
    }
}
