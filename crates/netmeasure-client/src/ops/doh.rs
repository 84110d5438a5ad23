//! Trusted resolution over DNS-over-HTTPS (JSON API).

use async_trait::async_trait;
use netmeasure_core::{TransportError, TransportResult, TrustedResolver};
use serde::Deserialize;
use std::net::IpAddr;
use tracing::debug;

use crate::NetClient;

const DNS_JSON: &str = "application/dns-json";

/// RR type code of an A record
const TYPE_A: u16 = 1;

/// RCODE for a name that does not exist
const RCODE_NXDOMAIN: u16 = 3;

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u16,

    #[serde(rename = "Answer", default)]
    answer: Vec<DohRecord>,
}

#[derive(Debug, Deserialize)]
struct DohRecord {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

#[async_trait]
impl TrustedResolver for NetClient {
    async fn resolve_trusted(&self, domain: &str) -> TransportResult<Vec<IpAddr>> {
        let response: DohResponse = self
            .get_json(
                &self.inner.config.doh_url,
                &[("name", domain), ("type", "A")],
                DNS_JSON,
            )
            .await?;

        let addresses = addresses(response)?;
        debug!(domain = %domain, count = addresses.len(), "DoH answer");
        Ok(addresses)
    }
}

fn addresses(response: DohResponse) -> TransportResult<Vec<IpAddr>> {
    match response.status {
        0 => Ok(response
            .answer
            .into_iter()
            .filter(|record| record.record_type == TYPE_A)
            .filter_map(|record| record.data.parse().ok())
            .collect()),
        RCODE_NXDOMAIN => Ok(Vec::new()),
        code => Err(TransportError::Dns(format!("DoH status {code}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProbeConfig;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> NetClient {
        NetClient::builder()
            .config(ProbeConfig::new().doh_url(format!("{}/resolve", server.uri())))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn keeps_only_a_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolve"))
            .and(query_param("name", "www.blocked.test"))
            .and(query_param("type", "A"))
            .and(header("accept", DNS_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Status": 0,
                "Answer": [
                    {"name": "www.blocked.test.", "type": 5, "TTL": 300, "data": "edge.cdn.test."},
                    {"name": "edge.cdn.test.", "type": 1, "TTL": 60, "data": "203.0.113.10"},
                    {"name": "edge.cdn.test.", "type": 1, "TTL": 60, "data": "203.0.113.11"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let addrs = client.resolve_trusted("www.blocked.test").await.unwrap();
        assert_eq!(
            addrs,
            vec![
                "203.0.113.10".parse::<IpAddr>().unwrap(),
                "203.0.113.11".parse::<IpAddr>().unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn nxdomain_is_an_empty_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Status": 3})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.resolve_trusted("gone.test").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn servfail_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/resolve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"Status": 2})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.resolve_trusted("broken.test").await.unwrap_err();
        assert_eq!(err, TransportError::Dns("DoH status 2".into()));
    }

    #[tokio::test]
    async fn http_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.resolve_trusted("blocked.test").await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)), "{err:?}");
    }
}
