//! Network operations for netmeasure.
//!
//! [`NetClient`] implements every transport trait from
//! [`netmeasure_core::transport`] with real sockets: reqwest for HTTP, DoH
//! and IP metadata, tokio-rustls for TLS, and hickory for DNS.

mod client;
mod config;
pub mod ops;

pub use client::{NetClient, NetClientBuilder};
pub use config::*;
pub use netmeasure_core::{MeasureError, Result, TransportError};
