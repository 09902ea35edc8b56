//! Command-line surface.
//!
//! Parsing is a pure function over an argument list; nothing is stored in
//! process-wide state, so it can be called any number of times.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{Config, ConfigError};
use crate::error::CheckError;
use crate::CheckRequest;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "getCertExpiry", version, about, long_about = None)]
pub struct Cli {
    /// Endpoint to check, as host:port
    #[arg(value_name = "HOST:PORT")]
    pub target: Option<String>,

    /// Disable certificate chain and hostname verification
    #[arg(long)]
    pub insecure: bool,

    /// Client certificate for mutual TLS (PEM); requires --key
    #[arg(long, value_name = "PATH")]
    pub cert: Option<PathBuf>,

    /// Client private key for mutual TLS (PEM); requires --cert
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Extra CA certificates trusted in addition to the system store (PEM)
    #[arg(long, value_name = "PATH")]
    pub ca: Option<PathBuf>,

    /// Connect and handshake timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file (defaults to ./getcertexpiry.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Parses an argument list, program name first.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

impl Cli {
    /// The flags that were actually given, as a configuration layer.
    pub fn as_config(&self) -> Config {
        Config {
            insecure: self.insecure.then_some(true),
            cert: self.cert.clone(),
            key: self.key.clone(),
            ca: self.ca.clone(),
            timeout: self.timeout,
        }
    }

    /// Resolves defaults, the configuration file and the flags into a request.
    pub fn into_request(self) -> Result<CheckRequest, CheckError> {
        let file = Config::discover(self.config.as_deref()).map_err(config_error)?;
        let config = Config::defaults()
            .merge_with(file)
            .merge_with(self.as_config());
        let timeout = config.timeout().map_err(config_error)?;

        Ok(CheckRequest {
            target: self.target.unwrap_or_default(),
            cert: config.cert,
            key: config.key,
            ca: config.ca,
            insecure: config.insecure.unwrap_or(false),
            timeout,
        })
    }
}

fn config_error(err: ConfigError) -> CheckError {
    CheckError::invalid_argument(format!("configuration: {}", err))
}
