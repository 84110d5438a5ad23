//! Configuration management.
//!
//! The file is TOML; every key is optional and overrides the built-in
//! default of the same name:
//!
//! ```toml
//! output_format = "json"
//! control_host = "example.com"
//! control_ip = "93.184.215.14"
//! http_timeout_ms = 5000
//! dns_timeout_ms = 2000
//! uppercase_sni = true
//! ```

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use netmeasure::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Always show explanations (as if --explain was passed).
    pub explain_by_default: bool,

    /// Connectivity precheck endpoint.
    pub connectivity_url: Option<String>,

    /// Reference host for the HTTP and SNI probes.
    pub control_host: Option<String>,

    /// Pinned address of the reference host.
    pub control_ip: Option<IpAddr>,

    /// Host header of the HTTP control request.
    pub nonexistent_host: Option<String>,

    /// IP-metadata service base URL.
    pub ip_info_url: Option<String>,

    /// DNS-over-HTTPS JSON endpoint.
    pub doh_url: Option<String>,

    /// Name answered with the querying resolver's address.
    pub resolver_identity_host: Option<String>,

    /// HTTP and TLS timeout in milliseconds.
    pub http_timeout_ms: Option<u64>,

    /// DNS timeout in milliseconds.
    pub dns_timeout_ms: Option<u64>,

    /// Upper-case the domain when validating resolver answers.
    pub uppercase_sni: Option<bool>,
}

impl Config {
    /// Get the config file path: `explicit` if given, else the per-user default.
    pub fn path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let dirs = ProjectDirs::from("org", "netmeasure", "netmeasure")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::path(explicit)?;

        if !path.exists() {
            if explicit.is_some() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.http_timeout_ms == Some(0) || config.dns_timeout_ms == Some(0) {
            anyhow::bail!("timeouts must be greater than zero");
        }
        Ok(config)
    }

    /// Probe configuration: built-in defaults with this file's overrides.
    pub fn probe_config(&self) -> ProbeConfig {
        let mut probe = ProbeConfig::new();

        if let Some(url) = &self.connectivity_url {
            probe = probe.connectivity_url(url);
        }
        if let Some(host) = &self.control_host {
            probe = probe.control_host(host);
        }
        if let Some(ip) = self.control_ip {
            probe = probe.control_ip(ip);
        }
        if let Some(host) = &self.nonexistent_host {
            probe = probe.nonexistent_host(host);
        }
        if let Some(url) = &self.ip_info_url {
            probe = probe.ip_info_url(url);
        }
        if let Some(url) = &self.doh_url {
            probe = probe.doh_url(url);
        }
        if let Some(host) = &self.resolver_identity_host {
            probe = probe.resolver_identity_host(host);
        }
        if let Some(ms) = self.http_timeout_ms {
            probe = probe.http_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.dns_timeout_ms {
            probe = probe.dns_timeout(Duration::from_millis(ms));
        }
        if let Some(enabled) = self.uppercase_sni {
            probe = probe.uppercase_sni(enabled);
        }

        probe
    }

    /// The effective configuration, every key filled in.
    pub fn effective(&self) -> Self {
        let probe = self.probe_config();
        Self {
            output_format: Some(self.output_format.unwrap_or_default()),
            explain_by_default: self.explain_by_default,
            connectivity_url: Some(probe.connectivity_url),
            control_host: Some(probe.control_host),
            control_ip: probe.control_ip,
            nonexistent_host: Some(probe.nonexistent_host),
            ip_info_url: Some(probe.ip_info_url),
            doh_url: Some(probe.doh_url),
            resolver_identity_host: Some(probe.resolver_identity_host),
            http_timeout_ms: Some(duration_ms(probe.http_timeout)),
            dns_timeout_ms: Some(duration_ms(probe.dns_timeout)),
            uppercase_sni: Some(probe.uppercase_sni),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_over_defaults() {
        let config = Config::parse(
            r#"
            control_host = "control.test"
            control_ip = "93.184.215.14"
            dns_timeout_ms = 750
            uppercase_sni = true
            "#,
        )
        .unwrap();

        let probe = config.probe_config();
        assert_eq!(probe.control_host, "control.test");
        assert_eq!(probe.control_ip, Some("93.184.215.14".parse().unwrap()));
        assert_eq!(probe.dns_timeout, Duration::from_millis(750));
        assert_eq!(probe.http_timeout, ProbeConfig::new().http_timeout);
        assert!(probe.uppercase_sni);
    }

    #[test]
    fn empty_file_is_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.probe_config(), ProbeConfig::new());
    }

    #[test]
    fn unknown_keys_and_zero_timeouts_are_rejected() {
        assert!(Config::parse("retries = 3").is_err());
        assert!(Config::parse("http_timeout_ms = 0").is_err());
    }

    #[test]
    fn effective_config_fills_every_key() {
        let effective = Config::default().effective();
        assert_eq!(effective.output_format, Some(OutputFormat::Text));
        assert_eq!(effective.http_timeout_ms, Some(5000));
        assert_eq!(effective.dns_timeout_ms, Some(2000));
        assert_eq!(effective.control_host.as_deref(), Some("example.com"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/netmeasure.toml"))).is_err());
    }
}
