use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClientContext, ProbeName, ProbeResult, ResolverContext, Verdict};

/// Everything one run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Domain under test
    pub domain: String,

    /// When the run started
    pub measured_at: DateTime<Utc>,

    /// Vantage point of the measurement
    pub client: ClientContext,

    /// Apparent identity of the system resolver
    pub resolver: ResolverContext,

    /// DNS, HTTP and SNI results, in that order
    pub results: [ProbeResult; 3],
}

impl Report {
    /// Result of the given probe
    #[must_use]
    pub fn result(&self, probe: ProbeName) -> &ProbeResult {
        let index = ProbeName::ALL
            .iter()
            .position(|p| *p == probe)
            .unwrap_or_default();
        &self.results[index]
    }

    /// Verdicts in report order
    #[must_use]
    pub fn verdicts(&self) -> [Verdict; 3] {
        [
            self.results[0].verdict(),
            self.results[1].verdict(),
            self.results[2].verdict(),
        ]
    }

    /// Returns true if any probe saw interference (likely or confirmed)
    #[must_use]
    pub fn any_interference(&self) -> bool {
        self.results.iter().any(|r| r.verdict().is_interference())
    }
}
