use serde::{Deserialize, Serialize};

/// Placeholder rendered when a metadata field could not be determined
pub const UNKNOWN: &str = "unknown";

/// Network identity of a vantage point: who the rest of the Internet sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    /// Two-letter country code (ISO 3166-1 alpha-2)
    #[serde(default = "unknown")]
    pub country: String,

    /// Autonomous system, e.g. `AS15169 Google LLC`
    #[serde(default = "unknown")]
    pub autonomous_system: String,

    /// Public IP address as text
    #[serde(default = "unknown")]
    pub ip: String,
}

/// The host running the measurement
pub type ClientContext = NetworkContext;

/// The system DNS resolver, as seen by authoritative servers
pub type ResolverContext = NetworkContext;

fn unknown() -> String {
    UNKNOWN.to_string()
}

impl Default for NetworkContext {
    fn default() -> Self {
        Self::unknown()
    }
}

impl NetworkContext {
    /// Create a context from its parts
    #[must_use]
    pub fn new(
        country: impl Into<String>,
        autonomous_system: impl Into<String>,
        ip: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            autonomous_system: autonomous_system.into(),
            ip: ip.into(),
        }
    }

    /// A context where every field is unknown
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN)
    }

    /// Returns true if no field was determined
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.country == UNKNOWN && self.autonomous_system == UNKNOWN && self.ip == UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_unknown() {
        let ctx: NetworkContext = serde_json::from_str(r#"{"ip": "198.51.100.7"}"#).unwrap();
        assert_eq!(ctx.ip, "198.51.100.7");
        assert_eq!(ctx.country, UNKNOWN);
        assert!(!ctx.is_unknown());
        assert!(NetworkContext::default().is_unknown());
    }
}
