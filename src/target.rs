use std::fmt;

use crate::error::CheckError;

/// A `host:port` connection target.
///
/// Parsing only checks shape; the host is resolved when the checker dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    /// Parses `host:port`, `ipv4:port` or `[ipv6]:port`.
    pub fn parse(input: &str) -> Result<Target, CheckError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CheckError::invalid_argument("target cannot be empty"));
        }

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| {
                CheckError::invalid_argument(format!("unterminated IPv6 address in '{}'", input))
            })?;
            let port = tail.strip_prefix(':').ok_or_else(|| missing_port(input))?;
            (host, port)
        } else {
            input.rsplit_once(':').ok_or_else(|| missing_port(input))?
        };

        if host.is_empty() {
            return Err(CheckError::invalid_argument(format!(
                "missing host in '{}'",
                input
            )));
        }
        if host.contains(':') && !input.starts_with('[') {
            return Err(CheckError::invalid_argument(format!(
                "IPv6 addresses must be bracketed, e.g. [::1]:443 (got '{}')",
                input
            )));
        }

        let port = match port.parse::<u16>() {
            Ok(0) | Err(_) => {
                return Err(CheckError::invalid_argument(format!(
                    "invalid port '{}' in '{}'",
                    port, input
                )))
            }
            Ok(port) => port,
        };

        Ok(Target {
            host: host.to_string(),
            port,
        })
    }
}

fn missing_port(input: &str) -> CheckError {
    CheckError::invalid_argument(format!("expected host:port, got '{}'", input))
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
