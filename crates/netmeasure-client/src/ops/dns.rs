//! DNS operations: system resolver lookups and direct wire queries.

use async_trait::async_trait;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use hickory_resolver::{ResolveError, TokioResolver};
use netmeasure_core::{DnsAnswer, DnsTransport, TransportError, TransportResult};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::NetClient;

const DNS_PORT: u16 = 53;

/// Advertised EDNS UDP payload size
const EDNS_PAYLOAD: u16 = 1232;

const MAX_DATAGRAM: usize = 4096;

/// Build a resolver from the host configuration with one attempt per query.
///
/// Returns `None` when the host configuration cannot be read.
pub(crate) fn system_resolver(config: &ProbeConfig) -> Option<TokioResolver> {
    match TokioResolver::builder_tokio() {
        Ok(mut builder) => {
            let opts = builder.options_mut();
            opts.timeout = config.dns_timeout;
            opts.attempts = 1;
            Some(builder.build())
        }
        Err(e) => {
            warn!(error = %e, "system resolver configuration unavailable");
            None
        }
    }
}

/// Mnemonic for a response code, as printed by `dig`
pub fn rcode_name(code: ResponseCode) -> String {
    match code {
        ResponseCode::NoError => "NOERROR".to_string(),
        ResponseCode::FormErr => "FORMERR".to_string(),
        ResponseCode::ServFail => "SERVFAIL".to_string(),
        ResponseCode::NXDomain => "NXDOMAIN".to_string(),
        ResponseCode::NotImp => "NOTIMP".to_string(),
        ResponseCode::Refused => "REFUSED".to_string(),
        ResponseCode::YXDomain => "YXDOMAIN".to_string(),
        ResponseCode::YXRRSet => "YXRRSET".to_string(),
        ResponseCode::NXRRSet => "NXRRSET".to_string(),
        ResponseCode::NotAuth => "NOTAUTH".to_string(),
        ResponseCode::NotZone => "NOTZONE".to_string(),
        other => format!("RCODE{}", u16::from(other)),
    }
}

impl NetClient {
    fn resolver(&self) -> TransportResult<&TokioResolver> {
        self.inner
            .resolver
            .as_ref()
            .ok_or_else(|| TransportError::Dns("system resolver unavailable".into()))
    }

    async fn lookup_ipv4(&self, name: &str) -> TransportResult<Vec<IpAddr>> {
        match self.resolver()?.ipv4_lookup(name).await {
            Ok(lookup) => Ok(lookup.iter().map(|a| IpAddr::V4(a.0)).collect()),
            Err(e) if is_empty_answer(&e) => {
                debug!(name = %name, error = %e, "resolver returned no records");
                Ok(Vec::new())
            }
            Err(e) => Err(TransportError::Dns(e.to_string())),
        }
    }
}

fn is_empty_answer(err: &ResolveError) -> bool {
    err.is_no_records_found() || err.is_nx_domain()
}

#[async_trait]
impl DnsTransport for NetClient {
    async fn root_nameserver(&self) -> TransportResult<IpAddr> {
        let lookup = self
            .resolver()?
            .ns_lookup(".")
            .await
            .map_err(|e| TransportError::Dns(format!("root NS lookup: {e}")))?;

        let name = lookup
            .iter()
            .next()
            .map(|ns| ns.0.to_utf8())
            .ok_or_else(|| TransportError::Dns("empty root NS set".into()))?;

        let addr = self
            .lookup_ipv4(&name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Dns(format!("no address for root server {name}")))?;

        debug!(root = %name, addr = %addr, "root nameserver");
        Ok(addr)
    }

    async fn query(&self, server: IpAddr, domain: &str) -> TransportResult<DnsAnswer> {
        let id = fastrand::u16(..);
        let request = build_query(id, domain)?;
        let target = SocketAddr::new(server, DNS_PORT);
        debug!(server = %target, domain = %domain, id, "direct DNS query");

        let bind: SocketAddr = match server {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let exchange = async {
            let socket = UdpSocket::bind(bind).await?;
            socket.connect(target).await?;
            socket.send(&request).await?;

            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                let n = socket.recv(&mut buf).await?;
                // Stray datagrams with a different ID are dropped.
                if let Some(answer) = parse_response(&buf[..n], id) {
                    return Ok::<_, std::io::Error>(answer);
                }
            }
        };

        let answer = tokio::time::timeout(self.inner.config.dns_timeout, exchange)
            .await
            .map_err(|_| TransportError::TimedOut)?
            .map_err(|e| TransportError::Dns(format!("{target}: {e}")))?;

        debug!(
            server = %target,
            status = %answer.response_status,
            answers = answer.answer_count,
            authority = answer.authority_count,
            "direct DNS response"
        );
        Ok(answer)
    }

    async fn resolve(&self, domain: &str) -> TransportResult<Vec<IpAddr>> {
        let addresses = self.lookup_ipv4(domain).await?;
        debug!(domain = %domain, count = addresses.len(), "system resolver answer");
        Ok(addresses)
    }

    async fn resolver_address(&self) -> TransportResult<IpAddr> {
        let host = &self.inner.config.resolver_identity_host;
        self.lookup_ipv4(host)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Dns(format!("no answer for {host}")))
    }
}

/// Non-recursive A query with DNSSEC requested (EDNS DO and AD bits), in wire format
fn build_query(id: u16, domain: &str) -> TransportResult<Vec<u8>> {
    let mut name = Name::from_ascii(domain)
        .map_err(|e| TransportError::Dns(format!("invalid domain '{domain}': {e}")))?;
    name.set_fqdn(true);

    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_PAYLOAD).set_dnssec_ok(true);

    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false)
        .set_authentic_data(true)
        .add_query(Query::query(name, RecordType::A));
    message.set_edns(edns);

    message
        .to_vec()
        .map_err(|e| TransportError::Dns(format!("failed to encode query: {e}")))
}

/// Decode a response; `None` if it is malformed or answers another query
fn parse_response(bytes: &[u8], expected_id: u16) -> Option<DnsAnswer> {
    let message = Message::from_vec(bytes).ok()?;
    if message.id() != expected_id || message.message_type() != MessageType::Response {
        return None;
    }

    let addresses = message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        })
        .collect();

    Some(DnsAnswer {
        addresses,
        response_status: rcode_name(message.response_code()),
        answer_count: message.answers().len(),
        authority_count: message.name_servers().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::{A, NS};
    use hickory_proto::rr::Record;

    fn response(id: u16, code: ResponseCode) -> Message {
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_response_code(code);
        message
    }

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    #[test]
    fn query_is_non_recursive_with_edns() {
        let bytes = build_query(0x1234, "blocked.test").unwrap();
        let message = Message::from_vec(&bytes).unwrap();

        assert_eq!(message.id(), 0x1234);
        assert!(!message.recursion_desired());
        assert!(message.authentic_data());
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::A);
        assert_eq!(message.queries()[0].name(), &name("blocked.test."));
        assert_eq!(message.extensions().as_ref().map(Edns::max_payload), Some(1232));
        assert!(message
            .extensions()
            .as_ref()
            .is_some_and(|edns| edns.flags().dnssec_ok));
    }

    #[test]
    fn query_rejects_malformed_domain() {
        let label = "a".repeat(64);
        assert!(build_query(1, &format!("{label}.test")).is_err());
    }

    #[test]
    fn referral_is_parsed() {
        let mut message = response(7, ResponseCode::NoError);
        message.add_name_server(Record::from_rdata(
            name("test."),
            172_800,
            RData::NS(NS(name("a.nic.test."))),
        ));

        let answer = parse_response(&message.to_vec().unwrap(), 7).unwrap();
        assert!(answer.is_referral());
        assert!(answer.addresses.is_empty());
    }

    #[test]
    fn injected_answer_is_parsed() {
        let mut message = response(9, ResponseCode::NoError);
        message.add_answer(Record::from_rdata(
            name("blocked.test."),
            60,
            RData::A(A::new(10, 0, 0, 5)),
        ));

        let answer = parse_response(&message.to_vec().unwrap(), 9).unwrap();
        assert_eq!(answer.answer_count, 1);
        assert!(answer.addresses.contains(&"10.0.0.5".parse::<IpAddr>().unwrap()));
        assert!(!answer.is_referral());
    }

    #[test]
    fn mismatched_id_is_ignored() {
        let message = response(9, ResponseCode::NoError);
        assert!(parse_response(&message.to_vec().unwrap(), 10).is_none());
        assert!(parse_response(b"\x00\x01", 1).is_none());
    }

    #[test]
    fn response_code_mnemonics() {
        assert_eq!(rcode_name(ResponseCode::NoError), "NOERROR");
        assert_eq!(rcode_name(ResponseCode::NXDomain), "NXDOMAIN");
        assert_eq!(rcode_name(ResponseCode::ServFail), "SERVFAIL");
        assert_eq!(rcode_name(ResponseCode::Refused), "REFUSED");
    }

    #[tokio::test]
    async fn reply_is_matched_over_udp() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();
        let request = build_query(3, "blocked.test").unwrap();

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket
            .connect(SocketAddr::from(([127, 0, 0, 1], port)))
            .await
            .unwrap();
        socket.send(&request).await.unwrap();

        let mut buf = [0u8; 512];
        let (n, peer) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(n, request.len());

        let mut reply = response(3, ResponseCode::NXDomain);
        reply.add_query(Query::query(name("blocked.test."), RecordType::A));
        server.send_to(&reply.to_vec().unwrap(), peer).await.unwrap();

        let n = socket.recv(&mut buf).await.unwrap();
        let answer = parse_response(&buf[..n], 3).unwrap();
        assert_eq!(answer.response_status, "NXDOMAIN");
    }
}
