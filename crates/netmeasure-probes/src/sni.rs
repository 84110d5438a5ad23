//! TLS/SNI interference probe.

use netmeasure_core::{ProbeName, ProbeResult, TlsTransport, TransportError};
use std::net::IpAddr;

/// Handshake with the control address presenting `domain` as SNI.
///
/// The control server does not serve `domain`, so a certificate name
/// mismatch is the expected outcome: it proves a ServerHello came back.
pub async fn probe(tls: &dyn TlsTransport, control: IpAddr, domain: &str) -> ProbeResult {
    let result = match tls.handshake(control, domain).await {
        Ok(()) => ProbeResult::ok(
            ProbeName::Sni,
            "handshake completed; SNI not being used to trigger blocking",
        ),
        Err(TransportError::CertificateNameMismatch(_)) => ProbeResult::ok(
            ProbeName::Sni,
            "ServerHello received (certificate not valid for the name, as expected); \
             SNI not being used to trigger blocking",
        ),
        Err(TransportError::EmptyResponse) => ProbeResult::interference(
            ProbeName::Sni,
            "connection reset before any TLS data was received",
        ),
        Err(TransportError::ConnectionReset(received)) => ProbeResult::inconclusive(
            ProbeName::Sni,
            format!("connection reset after {received} bytes of TLS data"),
        )
        .evidence("bytes_received", received),
        Err(TransportError::TlsHandshake(reason)) => ProbeResult::likely_interference(
            ProbeName::Sni,
            format!("TLS negotiation failed: {reason}"),
        ),
        Err(e) if e.is_connect_failure() => ProbeResult::inconclusive(
            ProbeName::Sni,
            format!("cannot connect to control address {control}: {e}"),
        ),
        Err(e) => ProbeResult::inconclusive(ProbeName::Sni, e.to_string()),
    };

    result.evidence("control_ip", control).evidence("sni", domain)
}
