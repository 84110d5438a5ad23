//! Educational features: what each command measures and how to read it.

use colored::Colorize;
use netmeasure::ProbeConfig;

/// Command explanation builder.
///
/// Explanations go to stderr so that stdout stays a clean report.
pub struct Explain {
    title: String,
    description: String,
    contacts: Vec<String>,
    what_happens: Vec<String>,
    verdicts: Vec<(String, String)>,
}

impl Explain {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            contacts: Vec::new(),
            what_happens: Vec::new(),
            verdicts: Vec::new(),
        }
    }

    fn description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    fn contacts(mut self, endpoint: &str) -> Self {
        self.contacts.push(endpoint.to_string());
        self
    }

    fn step(mut self, step: &str) -> Self {
        self.what_happens.push(step.to_string());
        self
    }

    fn verdict(mut self, verdict: &str, meaning: &str) -> Self {
        self.verdicts.push((verdict.to_string(), meaning.to_string()));
        self
    }

    /// Print the explanation to stderr.
    pub fn print(&self) {
        eprintln!();
        eprintln!("{}", format!("=== {} ===", self.title).bold().cyan());
        eprintln!("{}", self.description);
        eprintln!();

        if !self.what_happens.is_empty() {
            eprintln!("{}", "How it works:".bold());
            for (i, step) in self.what_happens.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, step);
            }
            eprintln!();
        }

        if !self.verdicts.is_empty() {
            eprintln!("{}", "Reading the verdicts:".bold());
            for (verdict, meaning) in &self.verdicts {
                eprintln!("  {:<20} {}", verdict.bold(), meaning);
            }
            eprintln!();
        }

        if !self.contacts.is_empty() {
            eprintln!("{}", "Contacts:".bold());
            for endpoint in &self.contacts {
                eprintln!("  {}", endpoint.dimmed());
            }
        }

        eprintln!();
        eprintln!("{}", "=== Results ===".bold().cyan());
        eprintln!();
    }

    // ========================================================================
    // Factory methods for each command
    // ========================================================================

    pub fn measure(domain: &str, config: &ProbeConfig) -> Self {
        let control = config
            .control_ip
            .map_or_else(|| config.control_host.clone(), |ip| format!("{} ({ip})", config.control_host));

        Self::new("Interference Measurement")
            .description(&format!(
                "Looks for signs that the network between you and {domain} is being tampered with."
            ))
            .step("Checks that you are online and not behind a captive portal (expects HTTP 204)")
            .step("Looks up your network and your DNS resolver's network")
            .step(&format!(
                "DNS: asks a root server directly for {domain}; a root server never answers, \
                 it only refers, so an answer means something on the path forged it"
            ))
            .step("DNS: checks the system resolver's address is routable and confirmed by DoH or a valid certificate")
            .step(&format!(
                "HTTP: fetches / from {control} twice, once with Host: {domain} and once with \
                 Host: {}; the two answers must match",
                config.nonexistent_host
            ))
            .step(&format!(
                "SNI: opens TLS to {control} naming {domain}; a certificate mismatch is expected, a reset is not"
            ))
            .verdict("OK", "no sign of interference")
            .verdict("INTERFERENCE", "positive evidence of tampering")
            .verdict("LIKELY_INTERFERENCE", "weak signal, such as a timeout that packet loss could explain")
            .verdict("INCONCLUSIVE", "the probe itself could not complete; run it again")
            .contacts(&config.connectivity_url)
            .contacts(&config.ip_info_url)
            .contacts(&config.doh_url)
            .contacts(&format!("{control} ports 80 and 443"))
    }

    pub fn validate_ip(domain: &str) -> Self {
        Self::new("Address Validation")
            .description(&format!(
                "Checks whether each address can legitimately serve {domain}."
            ))
            .step("Opens TLS to port 443 of each address, naming the domain")
            .step("VALID means the address presented a trusted certificate for the domain")
            .step("UNKNOWN means no proof either way: a wrong certificate, a timeout or a reset")
    }

    pub fn ip_info(ip: &str) -> Self {
        Self::new("IP Information")
            .description(&format!("Shows who announces {ip} and whether it is globally routable."))
            .step("Addresses in private, documentation or other reserved ranges are reported as not global")
            .step("Global addresses are looked up in the IP-metadata service")
    }
}
