use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The three probes, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeName {
    /// DNS injection and resolver validation
    Dns,
    /// Plaintext HTTP Host-header comparison
    Http,
    /// TLS handshake with the target as Server Name Indication
    Sni,
}

impl ProbeName {
    /// All probes in the order they run and render
    pub const ALL: [Self; 3] = [Self::Dns, Self::Http, Self::Sni];

    /// Label used in report headers
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dns => "DNS",
            Self::Http => "HTTP",
            Self::Sni => "SNI",
        }
    }
}

impl std::fmt::Display for ProbeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification produced by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// No sign of interference
    Ok,
    /// Positive evidence of interference
    Interference,
    /// Weak signal, e.g. a timeout that ordinary packet loss could explain
    LikelyInterference,
    /// The probe could not reach a conclusion
    Inconclusive,
}

impl Verdict {
    /// Label used in report headers
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Interference => "INTERFERENCE",
            Self::LikelyInterference => "LIKELY_INTERFERENCE",
            Self::Inconclusive => "INCONCLUSIVE",
        }
    }

    /// Returns true for both interference verdicts
    #[must_use]
    pub const fn is_interference(self) -> bool {
        matches!(self, Self::Interference | Self::LikelyInterference)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single probe invocation.
///
/// Fields are private: a result is built once by the probe that produced it
/// and only read afterwards. `detail` is the human-readable justification
/// and must reference the evidence it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedProbeResult")]
pub struct ProbeResult {
    probe: ProbeName,
    verdict: Verdict,
    detail: String,
    evidence: BTreeMap<String, String>,
}

/// Wire shape of a [`ProbeResult`], checked before conversion
#[derive(Deserialize)]
struct UncheckedProbeResult {
    probe: ProbeName,
    verdict: Verdict,
    detail: String,
    #[serde(default)]
    evidence: BTreeMap<String, String>,
}

impl TryFrom<UncheckedProbeResult> for ProbeResult {
    type Error = String;

    fn try_from(raw: UncheckedProbeResult) -> Result<Self, Self::Error> {
        if raw.detail.trim().is_empty() {
            return Err(format!("{} verdict without detail", raw.probe));
        }
        Ok(Self {
            probe: raw.probe,
            verdict: raw.verdict,
            detail: raw.detail,
            evidence: raw.evidence,
        })
    }
}

impl ProbeResult {
    /// Create a result with a justification.
    ///
    /// # Panics
    ///
    /// Panics if `detail` is empty: every verdict needs its reason.
    #[must_use]
    pub fn new(probe: ProbeName, verdict: Verdict, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        assert!(!detail.trim().is_empty(), "{probe} verdict without detail");
        Self {
            probe,
            verdict,
            detail,
            evidence: BTreeMap::new(),
        }
    }

    /// Shorthand for an `OK` result
    #[must_use]
    pub fn ok(probe: ProbeName, detail: impl Into<String>) -> Self {
        Self::new(probe, Verdict::Ok, detail)
    }

    /// Shorthand for an `INTERFERENCE` result
    #[must_use]
    pub fn interference(probe: ProbeName, detail: impl Into<String>) -> Self {
        Self::new(probe, Verdict::Interference, detail)
    }

    /// Shorthand for a `LIKELY_INTERFERENCE` result
    #[must_use]
    pub fn likely_interference(probe: ProbeName, detail: impl Into<String>) -> Self {
        Self::new(probe, Verdict::LikelyInterference, detail)
    }

    /// Shorthand for an `INCONCLUSIVE` result
    #[must_use]
    pub fn inconclusive(probe: ProbeName, detail: impl Into<String>) -> Self {
        Self::new(probe, Verdict::Inconclusive, detail)
    }

    /// Attach a piece of raw evidence
    #[must_use]
    pub fn evidence(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.evidence.insert(key.into(), value.to_string());
        self
    }

    /// Attach every entry of an evidence map gathered along the way
    #[must_use]
    pub fn with_evidence(mut self, evidence: &BTreeMap<String, String>) -> Self {
        self.evidence
            .extend(evidence.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Probe that produced this result
    #[must_use]
    pub const fn probe(&self) -> ProbeName {
        self.probe
    }

    /// Classification
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Justification text
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Raw evidence, sorted by key
    #[must_use]
    pub const fn raw_evidence(&self) -> &BTreeMap<String, String> {
        &self.evidence
    }
}
