//! Network operations the probes depend on.
//!
//! Probes never open sockets themselves: they call through these traits so
//! the classification logic can be exercised against test doubles. The
//! production implementation lives in `netmeasure-client`.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::error::TransportError;
use crate::types::{DnsAnswer, NetworkContext, RawHttpResponse};

/// Result type for a single network operation
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Plaintext HTTP operations
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` without following redirects and return the status code
    async fn status(&self, url: &str) -> TransportResult<u16>;

    /// `GET /` over port 80 of `addr`, sending `host` as the Host header
    async fn fetch_raw(&self, addr: IpAddr, host: &str) -> TransportResult<RawHttpResponse>;
}

/// TLS operations
#[async_trait]
pub trait TlsTransport: Send + Sync {
    /// Complete a TLS handshake with port 443 of `addr`, presenting
    /// `server_name` as SNI and verifying the certificate against it
    async fn handshake(&self, addr: IpAddr, server_name: &str) -> TransportResult<()>;
}

/// DNS operations over the wire and through the system resolver
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Address of the first root nameserver listed in the NS set of `.`
    async fn root_nameserver(&self) -> TransportResult<IpAddr>;

    /// Send a non-recursive A query for `domain` directly to `server`
    async fn query(&self, server: IpAddr, domain: &str) -> TransportResult<DnsAnswer>;

    /// A records for `domain` from the system resolver; empty when the
    /// resolver answered with no records
    async fn resolve(&self, domain: &str) -> TransportResult<Vec<IpAddr>>;

    /// Egress address of the system resolver, as seen by an authoritative server
    async fn resolver_address(&self) -> TransportResult<IpAddr>;
}

/// An independent resolver, harder to tamper with than the system one
#[async_trait]
pub trait TrustedResolver: Send + Sync {
    /// A records for `domain`
    async fn resolve_trusted(&self, domain: &str) -> TransportResult<Vec<IpAddr>>;
}

/// IP-metadata lookup service
#[async_trait]
pub trait IpMetadata: Send + Sync {
    /// Country and AS attribution for `ip`, or for the caller's own
    /// public address when `ip` is `None`
    async fn lookup(&self, ip: Option<IpAddr>) -> TransportResult<NetworkContext>;
}
