//! IP metadata from an ipinfo.io-compatible service.

use async_trait::async_trait;
use netmeasure_core::{IpMetadata, NetworkContext, TransportResult, UNKNOWN};
use serde::Deserialize;
use std::net::IpAddr;
use tracing::debug;

use crate::NetClient;

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    ip: Option<String>,
    country: Option<String>,
    /// `AS15169 Google LLC`
    org: Option<String>,
}

impl From<IpInfoResponse> for NetworkContext {
    fn from(info: IpInfoResponse) -> Self {
        let field = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        Self::new(field(info.country), field(info.org), field(info.ip))
    }
}

#[async_trait]
impl IpMetadata for NetClient {
    async fn lookup(&self, ip: Option<IpAddr>) -> TransportResult<NetworkContext> {
        let base = self.inner.config.ip_info_url.trim_end_matches('/');
        let url = match ip {
            Some(ip) => format!("{base}/{ip}/json"),
            None => format!("{base}/json"),
        };

        let info: IpInfoResponse = self.get_json(&url, &[], "application/json").await?;
        let context = NetworkContext::from(info);
        debug!(
            ip = %context.ip,
            country = %context.country,
            asn = %context.autonomous_system,
            "IP metadata"
        );
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProbeConfig;
    use netmeasure_core::TransportError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> NetClient {
        NetClient::builder()
            .config(ProbeConfig::new().ip_info_url(format!("{}/", server.uri())))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn own_address_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "198.51.100.7",
                "city": "Somewhere",
                "country": "NL",
                "org": "AS64500 Example Transit"
            })))
            .mount(&server)
            .await;

        let ctx = client_for(&server).await.lookup(None).await.unwrap();
        assert_eq!(
            ctx,
            NetworkContext::new("NL", "AS64500 Example Transit", "198.51.100.7")
        );
    }

    #[tokio::test]
    async fn missing_fields_are_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/10.0.0.1/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "10.0.0.1",
                "bogon": true
            })))
            .mount(&server)
            .await;

        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        let ctx = client_for(&server).await.lookup(Some(ip)).await.unwrap();
        assert_eq!(ctx.ip, "10.0.0.1");
        assert_eq!(ctx.country, UNKNOWN);
        assert_eq!(ctx.autonomous_system, UNKNOWN);
    }

    #[tokio::test]
    async fn rate_limit_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server).await.lookup(None).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)), "{err:?}");
    }
}
