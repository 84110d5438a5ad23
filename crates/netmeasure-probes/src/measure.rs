//! Measurement orchestration.

use chrono::Utc;
use netmeasure_client::{NetClient, ProbeConfig};
use netmeasure_core::{
    DnsTransport, HttpTransport, IpMetadata, MeasureError, NetworkContext, ProbeName,
    ProbeResult, Report, Result, TlsTransport, TransportResult, TrustedResolver,
};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::bogon::{self, BogonKind};
use crate::context::{client_context, resolver_context};
use crate::dns::DnsProbe;
use crate::validate::{validate_ip, IpValidation};
use crate::{connectivity, http, sni};

/// Longest name accepted as the domain under test
const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Runs the precheck and the three probes against one domain.
///
/// Each collaborator sits behind its own trait object, so a test can replace
/// any one of them.
pub struct Measurer {
    http: Arc<dyn HttpTransport>,
    tls: Arc<dyn TlsTransport>,
    dns: Arc<dyn DnsTransport>,
    trusted: Arc<dyn TrustedResolver>,
    metadata: Arc<dyn IpMetadata>,
    config: ProbeConfig,
}

impl Measurer {
    /// Use one implementation for every collaborator
    pub fn new<N>(config: ProbeConfig, network: Arc<N>) -> Self
    where
        N: HttpTransport + TlsTransport + DnsTransport + TrustedResolver + IpMetadata + 'static,
    {
        Self {
            http: network.clone(),
            tls: network.clone(),
            dns: network.clone(),
            trusted: network.clone(),
            metadata: network,
            config,
        }
    }

    /// Measure through real sockets, with the client's configuration
    #[must_use]
    pub fn from_client(client: NetClient) -> Self {
        let config = client.config().clone();
        Self::new(config, Arc::new(client))
    }

    /// Replace the HTTP transport
    #[must_use]
    pub fn with_http(mut self, http: Arc<dyn HttpTransport>) -> Self {
        self.http = http;
        self
    }

    /// Replace the TLS transport
    #[must_use]
    pub fn with_tls(mut self, tls: Arc<dyn TlsTransport>) -> Self {
        self.tls = tls;
        self
    }

    /// Replace the DNS transport
    #[must_use]
    pub fn with_dns(mut self, dns: Arc<dyn DnsTransport>) -> Self {
        self.dns = dns;
        self
    }

    /// Replace the trusted resolver
    #[must_use]
    pub fn with_trusted_resolver(mut self, trusted: Arc<dyn TrustedResolver>) -> Self {
        self.trusted = trusted;
        self
    }

    /// Replace the IP-metadata service
    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<dyn IpMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Configuration used for endpoints and reference hosts
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Connectivity precheck against the configured endpoint
    pub async fn is_online(&self) -> bool {
        connectivity::is_online(self.http.as_ref(), &self.config.connectivity_url).await
    }

    /// Measure `domain`.
    ///
    /// Fails with [`MeasureError::Offline`] when the precheck fails, before
    /// any probe runs, and with [`MeasureError::InvalidDomain`] for names
    /// that cannot be queried. Every other failure ends up in a verdict.
    pub async fn run(&self, domain: &str) -> Result<Report> {
        let domain = normalize_domain(domain)?;
        let measured_at = Utc::now();

        if !self.is_online().await {
            return Err(MeasureError::Offline {
                endpoint: self.config.connectivity_url.clone(),
            });
        }

        let client = client_context(self.metadata.as_ref()).await;
        let resolver = resolver_context(self.dns.as_ref(), self.metadata.as_ref()).await;

        let dns = DnsProbe {
            dns: self.dns.as_ref(),
            trusted: self.trusted.as_ref(),
            tls: self.tls.as_ref(),
        }
        .run(&domain, &self.config.validation_server_name(&domain))
        .await;
        log_result(&domain, &dns);

        let (http, sni) = match self.control_address().await {
            Ok(control) => {
                let http = http::probe(
                    self.http.as_ref(),
                    control,
                    &domain,
                    &self.config.nonexistent_host,
                )
                .await;
                log_result(&domain, &http);

                let sni = sni::probe(self.tls.as_ref(), control, &domain).await;
                log_result(&domain, &sni);
                (http, sni)
            }
            Err(e) => {
                let skipped = |probe| {
                    ProbeResult::inconclusive(probe, e.to_string())
                        .evidence("control_host", &self.config.control_host)
                };
                (skipped(ProbeName::Http), skipped(ProbeName::Sni))
            }
        };

        Ok(Report {
            domain,
            measured_at,
            client,
            resolver,
            results: [dns, http, sni],
        })
    }

    /// Address of the control host: the configured one, or the first A
    /// record from the trusted resolver.
    pub async fn control_address(&self) -> Result<IpAddr> {
        if let Some(ip) = self.config.control_ip {
            return Ok(ip);
        }

        let host = &self.config.control_host;
        let addresses = self.trusted.resolve_trusted(host).await.map_err(|e| {
            MeasureError::TestInfrastructure(format!("cannot resolve control host {host}: {e}"))
        })?;

        let control = addresses.first().copied().ok_or_else(|| {
            MeasureError::TestInfrastructure(format!("no address for control host {host}"))
        })?;
        debug!(host = %host, ip = %control, "control address");
        Ok(control)
    }

    /// Prove with a certificate whether each address can serve `domain`
    pub async fn validate_ips(&self, domain: &str, ips: &[IpAddr]) -> Vec<(IpAddr, IpValidation)> {
        let server_name = self.config.validation_server_name(domain);
        let mut outcomes = Vec::with_capacity(ips.len());
        for &ip in ips {
            outcomes.push((ip, validate_ip(self.tls.as_ref(), ip, &server_name).await));
        }
        outcomes
    }

    /// Metadata and routability of one address.
    ///
    /// Bogons are not looked up: the metadata service has nothing to say
    /// about them.
    pub async fn ip_info(&self, ip: IpAddr) -> (TransportResult<NetworkContext>, Option<BogonKind>) {
        match bogon::classify(ip) {
            Some(kind) => (
                Ok(NetworkContext {
                    ip: ip.to_string(),
                    ..NetworkContext::unknown()
                }),
                Some(kind),
            ),
            None => (self.metadata.lookup(Some(ip)).await, None),
        }
    }
}

fn log_result(domain: &str, result: &ProbeResult) {
    info!(
        domain = %domain,
        probe = %result.probe(),
        verdict = %result.verdict(),
        detail = %result.detail(),
        "probe finished"
    );
}

/// Lower-case `input`, drop a trailing dot and check it is a host name
pub fn normalize_domain(input: &str) -> Result<String> {
    let domain = input.trim().trim_end_matches('.').to_ascii_lowercase();
    let invalid = |why: &str| MeasureError::InvalidDomain(format!("'{input}': {why}"));

    if domain.is_empty() {
        return Err(invalid("empty name"));
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(invalid("name longer than 253 characters"));
    }
    if domain.parse::<IpAddr>().is_ok() {
        return Err(invalid("an address, not a domain"));
    }

    for label in domain.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(invalid("empty or over-long label"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("label starts or ends with a hyphen"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid("unexpected character"));
        }
    }

    Ok(domain)
}
