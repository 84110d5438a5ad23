//! Interference probes for netmeasure.
//!
//! - [`connectivity`]: is the host online and not behind a captive portal
//! - [`dns`]: root-server injection check and resolver validation
//! - [`http`]: Host-header comparison against a control server
//! - [`sni`]: TLS handshake with the target as Server Name Indication
//! - [`report`]: line-oriented rendering of a run
//!
//! [`Measurer`] ties them together in the fixed order precheck, context,
//! DNS, HTTP, SNI.

pub mod bogon;
pub mod connectivity;
pub mod context;
pub mod dns;
pub mod http;
mod measure;
pub mod report;
pub mod sni;
pub mod validate;

#[cfg(test)]
mod testing;

pub use bogon::{is_bogon, BogonKind};
pub use measure::{normalize_domain, Measurer};
pub use report::{render, render_report};
pub use validate::IpValidation;
