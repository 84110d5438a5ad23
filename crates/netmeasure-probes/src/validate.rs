//! Certificate-based proof that an address can serve a domain.

use netmeasure_core::{TlsTransport, TransportError};
use std::fmt;
use std::net::IpAddr;
use tracing::debug;

/// Outcome of validating one address for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpValidation {
    /// The address presented a certificate valid for the domain
    Valid,
    /// The address completed a handshake with a certificate for another name
    WrongCertificate(String),
    /// No conclusion could be drawn
    Unknown(TransportError),
}

impl IpValidation {
    /// Returns true if the address was proven to serve the domain
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for IpValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("VALID"),
            Self::WrongCertificate(name) => {
                write!(f, "UNKNOWN (certificate not valid for {name})")
            }
            Self::Unknown(e) => write!(f, "UNKNOWN ({e})"),
        }
    }
}

/// Handshake with `ip` presenting `server_name` and check the certificate.
pub async fn validate_ip(tls: &dyn TlsTransport, ip: IpAddr, server_name: &str) -> IpValidation {
    let outcome = match tls.handshake(ip, server_name).await {
        Ok(()) => IpValidation::Valid,
        Err(TransportError::CertificateNameMismatch(name)) => IpValidation::WrongCertificate(name),
        Err(e) => IpValidation::Unknown(e),
    };
    debug!(ip = %ip, server_name = %server_name, outcome = %outcome, "address validation");
    outcome
}
