//! Certificates and one-shot TLS servers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::Read;
use std::net::{IpAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslMethod};
use openssl::x509::extension::{BasicConstraints, KeyUsage, SubjectAlternativeName};
use openssl::x509::{X509Builder, X509Name, X509NameBuilder, X509};

pub const FAR_FUTURE: &str = "20990101000000Z";
pub const LONG_AGO: &str = "20000101000000Z";
pub const EXPIRED: &str = "20010101000000Z";

static SERIAL: AtomicU32 = AtomicU32::new(1);

/// A certificate together with its private key.
pub struct Issued {
    pub cert: X509,
    pub key: PKey<Private>,
}

pub fn new_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn base_builder(
    common_name: &str,
    key: &PKey<Private>,
    not_before: &str,
    not_after: &str,
) -> (X509Builder, X509Name) {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, common_name).unwrap();
    let name = name.build();

    let serial = BigNum::from_u32(SERIAL.fetch_add(1, Ordering::SeqCst))
        .unwrap()
        .to_asn1_integer()
        .unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::from_str(not_before).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::from_str(not_after).unwrap())
        .unwrap();
    (builder, name)
}

/// A self-signed CA valid until 2099.
pub fn certificate_authority(common_name: &str) -> Issued {
    let key = new_key();
    let (mut builder, name) = base_builder(common_name, &key, LONG_AGO, FAR_FUTURE);
    builder.set_issuer_name(&name).unwrap();
    builder
        .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    builder
        .append_extension(
            KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build()
                .unwrap(),
        )
        .unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();
    Issued {
        cert: builder.build(),
        key,
    }
}

/// An end-entity certificate for `sans`, signed by `issuer` or self-signed.
pub fn leaf(
    common_name: &str,
    sans: &[&str],
    not_after: &str,
    issuer: Option<&Issued>,
) -> Issued {
    let key = new_key();
    let (mut builder, name) = base_builder(common_name, &key, LONG_AGO, not_after);

    let mut san = SubjectAlternativeName::new();
    for entry in sans {
        if entry.parse::<IpAddr>().is_ok() {
            san.ip(entry);
        } else {
            san.dns(entry);
        }
    }

    match issuer {
        Some(issuer) => {
            builder.set_issuer_name(issuer.cert.subject_name()).unwrap();
            let ext = san
                .build(&builder.x509v3_context(Some(&issuer.cert), None))
                .unwrap();
            builder.append_extension(ext).unwrap();
            builder.sign(&issuer.key, MessageDigest::sha256()).unwrap();
        }
        None => {
            builder.set_issuer_name(&name).unwrap();
            let ext = san.build(&builder.x509v3_context(None, None)).unwrap();
            builder.append_extension(ext).unwrap();
            builder.sign(&key, MessageDigest::sha256()).unwrap();
        }
    }

    Issued {
        cert: builder.build(),
        key,
    }
}

/// Writes the certificate and key PEMs into `dir`, returning their paths.
pub fn write_identity(dir: &Path, name: &str, issued: &Issued) -> (PathBuf, PathBuf) {
    let cert_path = dir.join(format!("{}.crt", name));
    let key_path = dir.join(format!("{}.key", name));
    fs::write(&cert_path, issued.cert.to_pem().unwrap()).unwrap();
    fs::write(&key_path, issued.key.private_key_to_pem_pkcs8().unwrap()).unwrap();
    (cert_path, key_path)
}

/// TLS acceptor presenting `server`; callers may tighten it before serving.
pub fn acceptor(server: &Issued) -> SslAcceptorBuilder {
    let mut builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
    builder.set_certificate(&server.cert).unwrap();
    builder.set_private_key(&server.key).unwrap();
    builder.check_private_key().unwrap();
    builder
}

/// Serves a single TLS connection on an ephemeral loopback port.
pub fn serve_once(acceptor: SslAcceptorBuilder) -> u16 {
    let acceptor = acceptor.build();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        if let Ok((tcp, _)) = listener.accept() {
            if let Ok(mut stream) = acceptor.accept(tcp) {
                // Hold the session open until the client closes it.
                let mut buf = [0u8; 1];
                let _ = stream.read(&mut buf);
            }
        }
    });
    port
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A listener that records whether anybody connected.
pub struct WatchedPort {
    listener: TcpListener,
    pub port: u16,
}

impl WatchedPort {
    pub fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let port = listener.local_addr().unwrap().port();
        WatchedPort { listener, port }
    }

    pub fn was_contacted(&self) -> bool {
        self.listener.accept().is_ok()
    }
}
