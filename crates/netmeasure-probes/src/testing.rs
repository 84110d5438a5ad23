//! Scripted network double for probe tests.

use async_trait::async_trait;
use netmeasure_core::{
    DnsAnswer, DnsTransport, HttpTransport, IpMetadata, NetworkContext, RawHttpResponse,
    TlsTransport, TransportError, TransportResult, TrustedResolver, NOERROR,
};
use std::collections::{BTreeSet, HashMap};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ROOT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 41, 0, 4));
pub const CONTROL_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(93, 184, 215, 14));
pub const SITE_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(151, 101, 65, 69));
pub const RESOLVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9));
pub const CLIENT_IP: &str = "81.2.69.160";

pub fn answer(status: &str, addresses: &[IpAddr], authority: usize) -> DnsAnswer {
    DnsAnswer {
        addresses: addresses.iter().copied().collect::<BTreeSet<_>>(),
        response_status: status.to_string(),
        answer_count: addresses.len(),
        authority_count: authority,
    }
}

pub fn raw(response: &str) -> RawHttpResponse {
    RawHttpResponse::parse(response.as_bytes()).expect("non-empty response")
}

/// Every collaborator trait, answered from a script.
///
/// Unscripted HTTP hosts get the same default response; unscripted
/// handshakes fail to connect.
pub struct FakeNetwork {
    status: TransportResult<u16>,
    root: TransportResult<IpAddr>,
    root_answer: TransportResult<DnsAnswer>,
    resolved: TransportResult<Vec<IpAddr>>,
    resolver_addr: TransportResult<IpAddr>,
    trusted: HashMap<String, TransportResult<Vec<IpAddr>>>,
    fetch: HashMap<String, TransportResult<RawHttpResponse>>,
    fetch_default: TransportResult<RawHttpResponse>,
    handshakes: HashMap<IpAddr, TransportResult<()>>,
    metadata: TransportResult<NetworkContext>,

    pub query_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub trusted_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub handshake_calls: AtomicUsize,
}

impl FakeNetwork {
    /// A network where nothing interferes: the root refers, the resolver
    /// agrees with DoH, the control host answers the same for every Host
    /// header and its certificate only covers the control host.
    pub fn unblocked() -> Self {
        let mut trusted = HashMap::new();
        trusted.insert("example.com".to_string(), Ok(vec![CONTROL_IP]));

        let mut handshakes = HashMap::new();
        handshakes.insert(
            CONTROL_IP,
            Err(TransportError::CertificateNameMismatch("example.com".into())),
        );
        handshakes.insert(SITE_IP, Ok(()));

        Self {
            status: Ok(204),
            root: Ok(ROOT_IP),
            root_answer: Ok(answer(NOERROR, &[], 1)),
            resolved: Ok(vec![SITE_IP]),
            resolver_addr: Ok(RESOLVER_IP),
            trusted,
            fetch: HashMap::new(),
            fetch_default: Ok(raw(
                "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nnot found",
            )),
            handshakes,
            metadata: Ok(NetworkContext::new("NL", "AS64500 Example Transit", CLIENT_IP)),
            query_calls: AtomicUsize::new(0),
            resolve_calls: AtomicUsize::new(0),
            trusted_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            handshake_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_status(mut self, status: TransportResult<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_root(mut self, root: TransportResult<IpAddr>) -> Self {
        self.root = root;
        self
    }

    pub fn with_root_answer(mut self, answer: TransportResult<DnsAnswer>) -> Self {
        self.root_answer = answer;
        self
    }

    pub fn with_resolved(mut self, resolved: TransportResult<Vec<IpAddr>>) -> Self {
        self.resolved = resolved;
        self
    }

    pub fn with_resolver_addr(mut self, addr: TransportResult<IpAddr>) -> Self {
        self.resolver_addr = addr;
        self
    }

    pub fn with_trusted(mut self, domain: &str, result: TransportResult<Vec<IpAddr>>) -> Self {
        self.trusted.insert(domain.to_string(), result);
        self
    }

    pub fn with_fetch(mut self, host: &str, result: TransportResult<RawHttpResponse>) -> Self {
        self.fetch.insert(host.to_string(), result);
        self
    }

    pub fn with_handshake(mut self, ip: IpAddr, result: TransportResult<()>) -> Self {
        self.handshakes.insert(ip, result);
        self
    }

    pub fn with_metadata(mut self, metadata: TransportResult<NetworkContext>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for FakeNetwork {
    async fn status(&self, _url: &str) -> TransportResult<u16> {
        self.status.clone()
    }

    async fn fetch_raw(&self, _addr: IpAddr, host: &str) -> TransportResult<RawHttpResponse> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch
            .get(host)
            .cloned()
            .unwrap_or_else(|| self.fetch_default.clone())
    }
}

#[async_trait]
impl TlsTransport for FakeNetwork {
    async fn handshake(&self, addr: IpAddr, _server_name: &str) -> TransportResult<()> {
        self.handshake_calls.fetch_add(1, Ordering::SeqCst);
        self.handshakes
            .get(&addr)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::ConnectFailed(format!("{addr}:443 refused"))))
    }
}

#[async_trait]
impl DnsTransport for FakeNetwork {
    async fn root_nameserver(&self) -> TransportResult<IpAddr> {
        self.root.clone()
    }

    async fn query(&self, _server: IpAddr, _domain: &str) -> TransportResult<DnsAnswer> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.root_answer.clone()
    }

    async fn resolve(&self, _domain: &str) -> TransportResult<Vec<IpAddr>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.resolved.clone()
    }

    async fn resolver_address(&self) -> TransportResult<IpAddr> {
        self.resolver_addr.clone()
    }
}

#[async_trait]
impl TrustedResolver for FakeNetwork {
    async fn resolve_trusted(&self, domain: &str) -> TransportResult<Vec<IpAddr>> {
        self.trusted_calls.fetch_add(1, Ordering::SeqCst);
        self.trusted
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Ok(vec![SITE_IP]))
    }
}

#[async_trait]
impl IpMetadata for FakeNetwork {
    async fn lookup(&self, ip: Option<IpAddr>) -> TransportResult<NetworkContext> {
        let mut context = self.metadata.clone()?;
        if let Some(ip) = ip {
            context.ip = ip.to_string();
        }
        Ok(context)
    }
}
