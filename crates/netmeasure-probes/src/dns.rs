//! DNS interference probe.
//!
//! Two stages, run in order and never revisited:
//!
//! 1. **Injection check**: a non-recursive query sent straight to a root
//!    server must come back as a bare referral (`NOERROR`, no answers, at
//!    least one authority record). Anything else was forged on the path.
//! 2. **Resolver validation**: the system resolver's first address must be
//!    routable and either agree with a trusted DoH resolver or present a
//!    certificate valid for the domain.

use netmeasure_core::{
    DnsTransport, ProbeName, ProbeResult, TlsTransport, TransportError, TrustedResolver,
};
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::bogon;
use crate::validate::{validate_ip, IpValidation};

type Evidence = BTreeMap<String, String>;

/// Network collaborators of the DNS probe
pub struct DnsProbe<'a> {
    pub dns: &'a dyn DnsTransport,
    pub trusted: &'a dyn TrustedResolver,
    pub tls: &'a dyn TlsTransport,
}

impl DnsProbe<'_> {
    /// Classify `domain`. `server_name` is presented when validating the
    /// resolver's answer over TLS; it differs from `domain` only in case.
    pub async fn run(&self, domain: &str, server_name: &str) -> ProbeResult {
        let mut evidence = Evidence::new();

        if let Err(result) = self.injection_check(domain, &mut evidence).await {
            return result.with_evidence(&evidence);
        }
        self.validate_resolver(domain, server_name, &mut evidence)
            .await
            .with_evidence(&evidence)
    }

    /// `Ok` when the root answered with a clean referral; otherwise the
    /// final result of the probe.
    async fn injection_check(
        &self,
        domain: &str,
        evidence: &mut Evidence,
    ) -> Result<(), ProbeResult> {
        let root = self.dns.root_nameserver().await.map_err(|e| {
            ProbeResult::inconclusive(
                ProbeName::Dns,
                format!("could not determine a root nameserver: {e}"),
            )
        })?;
        evidence.insert("root_server".into(), root.to_string());

        let answer = self.dns.query(root, domain).await.map_err(|e| {
            ProbeResult::inconclusive(
                ProbeName::Dns,
                format!("query to root server {root} failed: {e}"),
            )
        })?;

        evidence.insert("root_status".into(), answer.response_status.clone());
        evidence.insert("root_answers".into(), answer.answer_count.to_string());
        evidence.insert("root_authority".into(), answer.authority_count.to_string());
        if !answer.addresses.is_empty() {
            evidence.insert("root_addresses".into(), join(answer.addresses.iter()));
        }

        if answer.is_referral() {
            debug!(domain = %domain, root = %root, "root referral intact");
            return Ok(());
        }

        Err(ProbeResult::interference(
            ProbeName::Dns,
            format!(
                "root server {root} answered {} with {} answer(s) and {} authority record(s) \
                 instead of a referral; the response was injected on the path",
                answer.response_status, answer.answer_count, answer.authority_count
            ),
        ))
    }

    async fn validate_resolver(
        &self,
        domain: &str,
        server_name: &str,
        evidence: &mut Evidence,
    ) -> ProbeResult {
        let addresses = match self.dns.resolve(domain).await {
            Ok(addresses) => addresses,
            Err(e) => {
                return ProbeResult::inconclusive(
                    ProbeName::Dns,
                    format!("system resolver failed: {e}"),
                );
            }
        };

        let Some(&candidate) = addresses.first() else {
            return ProbeResult::interference(ProbeName::Dns, "no addresses from resolver");
        };
        evidence.insert("resolver_addresses".into(), join(addresses.iter()));

        if let Some(kind) = bogon::classify(candidate) {
            return ProbeResult::interference(
                ProbeName::Dns,
                format!("resolver returned bogon address {candidate} ({kind})"),
            );
        }

        match self.trusted.resolve_trusted(domain).await {
            Ok(trusted) => {
                evidence.insert("doh_addresses".into(), join(trusted.iter()));
                if let Some(shared) = addresses.iter().find(|ip| trusted.contains(ip)) {
                    return ProbeResult::ok(
                        ProbeName::Dns,
                        format!("resolver address {shared} confirmed by trusted DoH resolver"),
                    );
                }
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "trusted resolver lookup failed");
                evidence.insert("doh_error".into(), e.to_string());
            }
        }

        self.certificate_check(candidate, server_name).await
    }

    async fn certificate_check(&self, candidate: IpAddr, server_name: &str) -> ProbeResult {
        match validate_ip(self.tls, candidate, server_name).await {
            IpValidation::Valid => ProbeResult::ok(
                ProbeName::Dns,
                format!("IP {candidate} independently proven valid via certificate"),
            ),
            IpValidation::WrongCertificate(_) => ProbeResult::interference(
                ProbeName::Dns,
                format!(
                    "resolver returned an address that cannot serve this domain: \
                     {candidate} presented a certificate not valid for {server_name}"
                ),
            ),
            IpValidation::Unknown(e) => ProbeResult::inconclusive(
                ProbeName::Dns,
                format!("could not validate {candidate}: {}", describe(&e)),
            ),
        }
    }
}

fn describe(err: &TransportError) -> String {
    match err {
        TransportError::EmptyResponse => "connection closed before any TLS data".to_string(),
        other => other.to_string(),
    }
}

fn join<'a>(addresses: impl Iterator<Item = &'a IpAddr>) -> String {
    addresses
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
