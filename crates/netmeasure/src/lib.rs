//! Network interference classifier.
//!
//! Probes the local network for censorship of one domain with three
//! independent tests (DNS, plaintext HTTP, TLS/SNI) and classifies each one
//! as `OK`, `INTERFERENCE`, `LIKELY_INTERFERENCE` or `INCONCLUSIVE`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use netmeasure::{render_report, Measurer, NetClient};
//!
//! #[tokio::main]
//! async fn main() -> netmeasure::Result<()> {
//!     let measurer = Measurer::from_client(NetClient::new()?);
//!
//!     let report = measurer.run("example.org").await?;
//!     print!("{}", render_report(&report));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - `rustls` and `probes`
//! - `rustls` - Use rustls for the HTTP client (recommended)
//! - `native-tls` - Use system native TLS for the HTTP client
//! - `probes` - Probes, orchestration and report rendering
//!
//! The TLS probes always use rustls: they need the verifier's error
//! categories, whatever backend serves plain HTTP requests.

// Re-export core types
pub use netmeasure_core::*;

// Re-export client
pub use netmeasure_client::{NetClient, NetClientBuilder, ProbeConfig};

// Re-export probes if enabled
#[cfg(feature = "probes")]
pub use netmeasure_probes as probes;
#[cfg(feature = "probes")]
pub use netmeasure_probes::{normalize_domain, render_report, Measurer};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
