//! Line-oriented text report.
//!
//! Key names are stable and meant to be grepped:
//!
//! ```text
//! client_country: NL
//! client_as: AS64500 Example Transit
//! client_ip: 81.2.69.160
//! resolver_country: NL
//! resolver_as: AS64500 Example Transit
//! resolver_ip: 9.9.9.9
//! DNS: OK
//!   detail: ...
//!   root_server: 198.41.0.4
//! HTTP: ...
//! SNI: ...
//! ```

use netmeasure_core::{ClientContext, ProbeResult, Report, ResolverContext, UNKNOWN};
use std::fmt::Write;

/// Render client and resolver metadata followed by one block per probe,
/// in the order given.
#[must_use]
pub fn render(client: &ClientContext, resolver: &ResolverContext, results: &[ProbeResult; 3]) -> String {
    let mut out = String::new();

    for (prefix, ctx) in [("client", client), ("resolver", resolver)] {
        line(&mut out, "", &format!("{prefix}_country"), &ctx.country);
        line(&mut out, "", &format!("{prefix}_as"), &ctx.autonomous_system);
        line(&mut out, "", &format!("{prefix}_ip"), &ctx.ip);
    }

    for result in results {
        line(&mut out, "", result.probe().as_str(), result.verdict().as_str());
        line(&mut out, "  ", "detail", result.detail());
        for (key, value) in result.raw_evidence() {
            line(&mut out, "  ", key, value);
        }
    }

    out
}

/// Render a full [`Report`]
#[must_use]
pub fn render_report(report: &Report) -> String {
    render(&report.client, &report.resolver, &report.results)
}

fn line(out: &mut String, indent: &str, key: &str, value: &str) {
    let value = value.trim();
    let value = if value.is_empty() { UNKNOWN } else { value };
    // One record per line, whatever the value contains.
    let value = value.replace(['\r', '\n'], " ");
    let _ = writeln!(out, "{indent}{key}: {value}");
}
