//! Main network client implementation.

use crate::config::ProbeConfig;
use crate::ops::from_reqwest;
use hickory_resolver::TokioResolver;
use netmeasure_core::{MeasureError, Result, TransportError, TransportResult};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Client used for every network operation of a run.
///
/// Cheap to clone; all clones share the same HTTP client, TLS
/// configuration and system resolver.
#[derive(Clone)]
pub struct NetClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: HttpClient,
    pub(crate) tls: Arc<rustls::ClientConfig>,
    pub(crate) resolver: Option<TokioResolver>,
    pub(crate) config: ProbeConfig,
    pub(crate) user_agent: String,
}

impl NetClient {
    /// Create a client with default endpoints and timeouts
    pub fn new() -> Result<Self> {
        NetClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> NetClientBuilder {
        NetClientBuilder::new()
    }

    /// Configuration this client was built with
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.inner.config
    }

    pub(crate) fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }

    /// Perform a GET request with query parameters and decode a JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        base: &str,
        params: &[(&str, &str)],
        accept: &str,
    ) -> TransportResult<T> {
        let url = build_url(base, params)?;
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url.as_str())
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http(format!("{url}: HTTP {}", status.as_u16())));
        }

        let body = response.text().await.map_err(|e| from_reqwest(&e))?;
        serde_json::from_str(&body)
            .map_err(|e| TransportError::Http(format!("{url}: invalid JSON: {e}")))
    }
}

fn build_url(base: &str, params: &[(&str, &str)]) -> TransportResult<Url> {
    let mut url =
        Url::parse(base).map_err(|e| TransportError::Http(format!("invalid URL '{base}': {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Builder for configuring a [`NetClient`]
pub struct NetClientBuilder {
    config: ProbeConfig,
    user_agent: String,
}

impl Default for NetClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetClientBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ProbeConfig::default(),
            user_agent: format!("netmeasure/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the probe configuration
    #[must_use]
    pub fn config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client.
    ///
    /// Fails if the HTTP client or the TLS configuration cannot be assembled.
    /// An unreadable system resolver configuration is not fatal: operations
    /// that need the system resolver report a DNS error instead.
    pub fn build(self) -> Result<NetClient> {
        // Redirects are not followed: a captive portal answering with a 302
        // must be seen as such by the connectivity precheck.
        let http = HttpClient::builder()
            .timeout(self.config.http_timeout)
            .connect_timeout(self.config.http_timeout)
            .user_agent(&self.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true)
            .build()
            .map_err(|e| MeasureError::Http(format!("failed to build HTTP client: {e}")))?;

        let tls = crate::ops::tls::client_config()?;
        let resolver = crate::ops::dns::system_resolver(&self.config);

        debug!(
            control_host = %self.config.control_host,
            http_timeout_ms = self.config.http_timeout.as_millis(),
            dns_timeout_ms = self.config.dns_timeout.as_millis(),
            "network client ready"
        );

        Ok(NetClient {
            inner: Arc::new(ClientInner {
                http,
                tls,
                resolver,
                config: self.config,
                user_agent: self.user_agent,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters_are_encoded() {
        let url = build_url("https://dns.test/resolve", &[("name", "a b.test"), ("type", "A")])
            .unwrap();
        assert_eq!(url.as_str(), "https://dns.test/resolve?name=a+b.test&type=A");
    }

    #[test]
    fn bad_base_url_is_an_http_error() {
        assert!(matches!(
            build_url("not a url", &[]),
            Err(TransportError::Http(_))
        ));
    }

    #[test]
    fn builder_keeps_config() {
        let client = NetClient::builder()
            .config(ProbeConfig::new().control_host("control.test"))
            .user_agent("probe/1")
            .build()
            .unwrap();
        assert_eq!(client.config().control_host, "control.test");
        assert_eq!(client.user_agent(), "probe/1");
    }
}
