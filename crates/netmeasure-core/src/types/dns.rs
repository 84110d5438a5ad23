use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Response status of a successful query
pub const NOERROR: &str = "NOERROR";

/// The parts of a single DNS response the probes care about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsAnswer {
    /// A/AAAA addresses found in the answer section
    #[serde(default)]
    pub addresses: BTreeSet<IpAddr>,

    /// Response code mnemonic (`NOERROR`, `NXDOMAIN`, `SERVFAIL`, ...)
    pub response_status: String,

    /// Number of records in the answer section
    pub answer_count: usize,

    /// Number of records in the authority section
    pub authority_count: usize,
}

impl DnsAnswer {
    /// Returns true for the shape a root server gives for a delegated name:
    /// `NOERROR`, no answers, at least one authority record.
    #[must_use]
    pub fn is_referral(&self) -> bool {
        self.response_status == NOERROR && self.answer_count == 0 && self.authority_count > 0
    }
}
