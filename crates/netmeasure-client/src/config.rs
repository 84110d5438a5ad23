//! Client and probe configuration types.

use std::net::IpAddr;
use std::time::Duration;

/// Endpoint expected to answer 204 with an empty body
pub const DEFAULT_CONNECTIVITY_URL: &str = "http://connectivitycheck.gstatic.com/generate_204";

/// Known-good reference server
pub const DEFAULT_CONTROL_HOST: &str = "example.com";

/// Host header that no virtual host can match (RFC 2606 reserves `.invalid`)
pub const DEFAULT_NONEXISTENT_HOST: &str = "no-such-host.invalid";

/// IP-metadata service base URL (ipinfo.io-compatible)
pub const DEFAULT_IP_INFO_URL: &str = "https://ipinfo.io";

/// DNS-over-HTTPS JSON endpoint (Google Public DNS-compatible)
pub const DEFAULT_DOH_URL: &str = "https://dns.google/resolve";

/// Name whose A record is answered with the address of the querying resolver
pub const DEFAULT_RESOLVER_IDENTITY_HOST: &str = "whoami.akamai.net";

/// Timeout for HTTP and TLS operations
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for DNS queries
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(2);

/// Endpoints, reference hosts and timeouts for a measurement run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Connectivity precheck endpoint
    pub connectivity_url: String,

    /// Reference host for the HTTP and SNI probes
    pub control_host: String,

    /// Pinned address of the reference host; resolved through DoH when unset
    pub control_ip: Option<IpAddr>,

    /// Host header used for the HTTP control request
    pub nonexistent_host: String,

    /// IP-metadata service base URL
    pub ip_info_url: String,

    /// DNS-over-HTTPS JSON endpoint
    pub doh_url: String,

    /// Name used to discover the system resolver's egress address
    pub resolver_identity_host: String,

    /// Timeout for each HTTP or TLS operation
    pub http_timeout: Duration,

    /// Timeout for each DNS query
    pub dns_timeout: Duration,

    /// Upper-case the domain when validating resolver answers over TLS,
    /// to catch filters that only match lower-case SNI
    pub uppercase_sni: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConfig {
    /// Create a configuration with the default endpoints and timeouts
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectivity_url: DEFAULT_CONNECTIVITY_URL.to_string(),
            control_host: DEFAULT_CONTROL_HOST.to_string(),
            control_ip: None,
            nonexistent_host: DEFAULT_NONEXISTENT_HOST.to_string(),
            ip_info_url: DEFAULT_IP_INFO_URL.to_string(),
            doh_url: DEFAULT_DOH_URL.to_string(),
            resolver_identity_host: DEFAULT_RESOLVER_IDENTITY_HOST.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            uppercase_sni: false,
        }
    }

    /// Set the connectivity precheck endpoint
    #[must_use]
    pub fn connectivity_url(mut self, url: impl Into<String>) -> Self {
        self.connectivity_url = url.into();
        self
    }

    /// Set the reference host
    #[must_use]
    pub fn control_host(mut self, host: impl Into<String>) -> Self {
        self.control_host = host.into();
        self
    }

    /// Pin the reference host to an address
    #[must_use]
    pub const fn control_ip(mut self, ip: IpAddr) -> Self {
        self.control_ip = Some(ip);
        self
    }

    /// Set the Host header of the HTTP control request
    #[must_use]
    pub fn nonexistent_host(mut self, host: impl Into<String>) -> Self {
        self.nonexistent_host = host.into();
        self
    }

    /// Set the IP-metadata base URL
    #[must_use]
    pub fn ip_info_url(mut self, url: impl Into<String>) -> Self {
        self.ip_info_url = url.into();
        self
    }

    /// Set the DNS-over-HTTPS endpoint
    #[must_use]
    pub fn doh_url(mut self, url: impl Into<String>) -> Self {
        self.doh_url = url.into();
        self
    }

    /// Set the resolver identity name
    #[must_use]
    pub fn resolver_identity_host(mut self, host: impl Into<String>) -> Self {
        self.resolver_identity_host = host.into();
        self
    }

    /// Set the HTTP/TLS timeout
    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the DNS timeout
    #[must_use]
    pub const fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Enable or disable upper-cased SNI during resolver validation
    #[must_use]
    pub const fn uppercase_sni(mut self, enabled: bool) -> Self {
        self.uppercase_sni = enabled;
        self
    }

    /// Name to present when validating a resolver answer over TLS
    #[must_use]
    pub fn validation_server_name(&self, domain: &str) -> String {
        if self.uppercase_sni {
            domain.to_ascii_uppercase()
        } else {
            domain.to_string()
        }
    }
}
