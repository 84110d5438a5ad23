//! Network identity of the client and of its DNS resolver.
//!
//! Both lookups degrade to `unknown` fields instead of failing the run.

use netmeasure_core::{ClientContext, DnsTransport, IpMetadata, NetworkContext, ResolverContext};
use tracing::warn;

/// Country, AS and public address of the measuring host
pub async fn client_context(metadata: &dyn IpMetadata) -> ClientContext {
    metadata.lookup(None).await.unwrap_or_else(|e| {
        warn!(error = %e, "client metadata lookup failed");
        NetworkContext::unknown()
    })
}

/// Country, AS and egress address of the system resolver
pub async fn resolver_context(dns: &dyn DnsTransport, metadata: &dyn IpMetadata) -> ResolverContext {
    let ip = match dns.resolver_address().await {
        Ok(ip) => ip,
        Err(e) => {
            warn!(error = %e, "resolver address discovery failed");
            return NetworkContext::unknown();
        }
    };

    metadata.lookup(Some(ip)).await.unwrap_or_else(|e| {
        warn!(ip = %ip, error = %e, "resolver metadata lookup failed");
        ResolverContext {
            ip: ip.to_string(),
            ..NetworkContext::unknown()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeNetwork, CLIENT_IP, RESOLVER_IP};
    use netmeasure_core::{TransportError, UNKNOWN};

    #[tokio::test]
    async fn client_lookup() {
        let net = FakeNetwork::unblocked();
        let ctx = client_context(&net).await;
        assert_eq!(ctx.ip, CLIENT_IP);
        assert_eq!(ctx.country, "NL");
    }

    #[tokio::test]
    async fn resolver_lookup_uses_discovered_address() {
        let net = FakeNetwork::unblocked();
        let ctx = resolver_context(&net, &net).await;
        assert_eq!(ctx.ip, RESOLVER_IP.to_string());
        assert_eq!(ctx.autonomous_system, "AS64500 Example Transit");
    }

    #[tokio::test]
    async fn failures_degrade_to_unknown() {
        let net = FakeNetwork::unblocked().with_metadata(Err(TransportError::Http("429".into())));
        assert!(client_context(&net).await.is_unknown());

        let ctx = resolver_context(&net, &net).await;
        assert_eq!(ctx.ip, RESOLVER_IP.to_string());
        assert_eq!(ctx.country, UNKNOWN);

        let net = FakeNetwork::unblocked()
            .with_resolver_addr(Err(TransportError::Dns("no answer".into())));
        assert!(resolver_context(&net, &net).await.is_unknown());
    }
}
