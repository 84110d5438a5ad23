//! # netmeasure-cli
//!
//! Command-line network interference classifier.
//!
//! ## Features
//!
//! - **Measurement**: DNS, HTTP and SNI verdicts for one domain
//! - **Address validation**: certificate proof that an address serves a domain
//! - **IP information**: country, AS and routability of an address
//! - **Educational mode**: `--explain` describes what each command does
//! - **Output formats**: line-oriented text or JSON

pub mod cli;
pub mod config;
pub mod education;
pub mod output;

pub use cli::run;
