//! Core types and traits for netmeasure.
//!
//! This crate provides the foundational types shared by the client, the
//! probes and the CLI:
//!
//! - **Types**: [`ProbeResult`], [`Verdict`], [`NetworkContext`], [`DnsAnswer`], [`Report`]
//! - **Errors**: run-level [`MeasureError`] and transport-level [`TransportError`]
//! - **Traits**: the network operations probes call through ([`transport`])
//!
//! # Example
//!
//! ```rust
//! use netmeasure_core::{ProbeName, ProbeResult, Verdict};
//!
//! let result = ProbeResult::interference(ProbeName::Http, "target response differs from control")
//!     .evidence("target_status", "HTTP/1.1 403 Forbidden");
//! assert_eq!(result.verdict(), Verdict::Interference);
//! ```

mod error;
pub mod transport;
pub mod types;

pub use error::{MeasureError, Result, TransportError};
pub use transport::{
    DnsTransport, HttpTransport, IpMetadata, TlsTransport, TransportResult, TrustedResolver,
};
pub use types::*;
