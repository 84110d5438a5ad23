//! Addresses that must never appear in global routing.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Why an address is not globally routable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BogonKind {
    Unspecified,
    Private,
    Shared,
    Loopback,
    LinkLocal,
    Documentation,
    Benchmarking,
    Reserved,
    Multicast,
    Broadcast,
    UniqueLocal,
}

impl BogonKind {
    /// Short description used in probe details
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Private => "private-use",
            Self::Shared => "shared address space",
            Self::Loopback => "loopback",
            Self::LinkLocal => "link-local",
            Self::Documentation => "documentation",
            Self::Benchmarking => "benchmarking",
            Self::Reserved => "reserved",
            Self::Multicast => "multicast",
            Self::Broadcast => "broadcast",
            Self::UniqueLocal => "unique-local",
        }
    }
}

impl fmt::Display for BogonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `ip` is a bogon
#[must_use]
pub fn is_bogon(ip: IpAddr) -> bool {
    classify(ip).is_some()
}

/// Classify `ip`, or `None` if it is globally routable
#[must_use]
pub fn classify(ip: IpAddr) -> Option<BogonKind> {
    match ip {
        IpAddr::V4(v4) => classify_v4(v4),
        IpAddr::V6(v6) => classify_v6(v6),
    }
}

fn classify_v4(ip: Ipv4Addr) -> Option<BogonKind> {
    let [a, b, c, _] = ip.octets();

    let kind = match (a, b, c) {
        _ if ip.is_broadcast() => BogonKind::Broadcast,
        (0, _, _) => BogonKind::Unspecified,
        (10, _, _) => BogonKind::Private,
        (100, 64..=127, _) => BogonKind::Shared,
        (127, _, _) => BogonKind::Loopback,
        (169, 254, _) => BogonKind::LinkLocal,
        (172, 16..=31, _) => BogonKind::Private,
        (192, 0, 0) => BogonKind::Reserved,
        (192, 0, 2) | (198, 51, 100) | (203, 0, 113) => BogonKind::Documentation,
        (192, 168, _) => BogonKind::Private,
        (198, 18..=19, _) => BogonKind::Benchmarking,
        (224..=239, _, _) => BogonKind::Multicast,
        (240..=255, _, _) => BogonKind::Reserved,
        _ => return None,
    };
    Some(kind)
}

fn classify_v6(ip: Ipv6Addr) -> Option<BogonKind> {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return classify_v4(v4);
    }

    let segments = ip.segments();
    let kind = match segments[0] {
        _ if ip.is_unspecified() => BogonKind::Unspecified,
        _ if ip.is_loopback() => BogonKind::Loopback,
        0x2001 if segments[1] == 0x0db8 => BogonKind::Documentation,
        0x0100 if segments[1..4] == [0, 0, 0] => BogonKind::Reserved,
        s if s & 0xfe00 == 0xfc00 => BogonKind::UniqueLocal,
        s if s & 0xffc0 == 0xfe80 => BogonKind::LinkLocal,
        s if s & 0xff00 == 0xff00 => BogonKind::Multicast,
        _ => return None,
    };
    Some(kind)
}
