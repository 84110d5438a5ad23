//! HTTP interference probe.
//!
//! Both requests go to the control address, so the network path is the same;
//! only the Host header changes. A server that does not host either name
//! answers both the same way, so any difference was introduced on the path.

use netmeasure_core::{HttpTransport, ProbeName, ProbeResult, RawHttpResponse, TransportError};
use std::net::IpAddr;
use tracing::debug;

/// Longest status line or body excerpt kept as evidence
const EXCERPT_LEN: usize = 80;

/// Compare the control server's answer for `domain` and for `decoy_host`.
pub async fn probe(
    http: &dyn HttpTransport,
    control: IpAddr,
    domain: &str,
    decoy_host: &str,
) -> ProbeResult {
    let target = match http.fetch_raw(control, domain).await {
        Ok(response) => response,
        Err(e) => return classify_target_failure(&e, control).evidence("control_ip", control),
    };

    let reference = match http.fetch_raw(control, decoy_host).await {
        Ok(response) => response,
        Err(e) => {
            return ProbeResult::inconclusive(
                ProbeName::Http,
                format!("control request for {decoy_host} failed: {e}"),
            )
            .evidence("control_ip", control)
            .evidence("target_status", &target.status_line);
        }
    };

    compare(&target, &reference, domain)
        .evidence("control_ip", control)
        .evidence("decoy_host", decoy_host)
}

fn classify_target_failure(err: &TransportError, control: IpAddr) -> ProbeResult {
    match err {
        TransportError::EmptyResponse => ProbeResult::interference(
            ProbeName::Http,
            "empty response: connection closed without any data (injected reset/FIN)",
        ),
        TransportError::ConnectionReset(received) => ProbeResult::interference(
            ProbeName::Http,
            format!("connection reset after {received} bytes of response"),
        )
        .evidence("bytes_received", received),
        TransportError::TimedOut => ProbeResult::likely_interference(
            ProbeName::Http,
            "timed out waiting for a response after connecting",
        ),
        e if e.is_connect_failure() => ProbeResult::inconclusive(
            ProbeName::Http,
            format!("cannot connect to control address {control}: {e}"),
        ),
        e => ProbeResult::inconclusive(ProbeName::Http, format!("request failed: {e}")),
    }
}

fn compare(target: &RawHttpResponse, reference: &RawHttpResponse, domain: &str) -> ProbeResult {
    if target.same_as(reference) {
        debug!(domain = %domain, status = %target.status_line, "responses identical");
        return ProbeResult::ok(
            ProbeName::Http,
            format!("response for {domain} is identical to the control response"),
        )
        .evidence("status", &target.status_line);
    }

    let result = ProbeResult::interference(
        ProbeName::Http,
        format!("response for {domain} differs from the control response"),
    )
    .evidence("target_status", &target.status_line)
    .evidence("control_status", &reference.status_line)
    .evidence("target_body_bytes", target.body.len())
    .evidence("control_body_bytes", reference.body.len());

    match target.first_body_difference(reference) {
        Some(offset) => result
            .evidence("first_difference", offset)
            .evidence("target_body", excerpt(&target.body)),
        None => result,
    }
}

fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(&body[..body.len().min(EXCERPT_LEN)]);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{raw, FakeNetwork, CONTROL_IP};
    use netmeasure_core::Verdict;

    const DOMAIN: &str = "example-blocked.test";
    const DECOY: &str = "no-such-host.invalid";

    async fn run(net: &FakeNetwork) -> ProbeResult {
        probe(net, CONTROL_IP, DOMAIN, DECOY).await
    }

    #[tokio::test]
    async fn identical_responses_are_ok() {
        let net = FakeNetwork::unblocked();
        let result = run(&net).await;
        assert_eq!(result.verdict(), Verdict::Ok);
        assert_eq!(result.raw_evidence()["status"], "HTTP/1.1 404 Not Found");
        assert_eq!(FakeNetwork::count(&net.fetch_calls), 2);
    }

    #[tokio::test]
    async fn headers_are_not_compared() {
        let net = FakeNetwork::unblocked()
            .with_fetch(DOMAIN, Ok(raw("HTTP/1.1 404 Not Found\r\nDate: x\r\n\r\nnot found")))
            .with_fetch(DECOY, Ok(raw("HTTP/1.1 404 Not Found\r\nDate: y\r\n\r\nnot found")));
        assert_eq!(run(&net).await.verdict(), Verdict::Ok);
    }

    #[tokio::test]
    async fn single_differing_byte_is_interference() {
        let net = FakeNetwork::unblocked()
            .with_fetch(DOMAIN, Ok(raw("HTTP/1.1 404 Not Found\r\n\r\nnot fount")));
        let result = run(&net).await;
        assert_eq!(result.verdict(), Verdict::Interference);
        assert_eq!(result.raw_evidence()["first_difference"], "8");
    }

    #[tokio::test]
    async fn block_page_is_interference() {
        let net = FakeNetwork::unblocked().with_fetch(
            DOMAIN,
            Ok(raw("HTTP/1.1 403 Forbidden\r\n\r\n<html>Access   denied</html>")),
        );
        let result = run(&net).await;
        assert_eq!(result.verdict(), Verdict::Interference);
        assert_eq!(result.raw_evidence()["target_status"], "HTTP/1.1 403 Forbidden");
        assert_eq!(result.raw_evidence()["target_body"], "<html>Access denied</html>");
    }

    #[tokio::test]
    async fn empty_response_is_interference() {
        let net = FakeNetwork::unblocked().with_fetch(DOMAIN, Err(TransportError::EmptyResponse));
        let result = run(&net).await;
        assert_eq!(result.verdict(), Verdict::Interference);
        assert_eq!(FakeNetwork::count(&net.fetch_calls), 1);
    }

    #[tokio::test]
    async fn reset_after_data_is_interference() {
        let net =
            FakeNetwork::unblocked().with_fetch(DOMAIN, Err(TransportError::ConnectionReset(112)));
        let result = run(&net).await;
        assert_eq!(result.verdict(), Verdict::Interference);
        assert_eq!(result.raw_evidence()["bytes_received"], "112");
    }

    #[tokio::test]
    async fn timeout_is_likely_interference() {
        let net = FakeNetwork::unblocked().with_fetch(DOMAIN, Err(TransportError::TimedOut));
        assert_eq!(run(&net).await.verdict(), Verdict::LikelyInterference);
    }

    #[tokio::test]
    async fn unreachable_control_is_inconclusive() {
        for err in [
            TransportError::ConnectFailed("connection refused".into()),
            TransportError::ConnectTimeout,
        ] {
            let net = FakeNetwork::unblocked().with_fetch(DOMAIN, Err(err));
            let result = run(&net).await;
            assert_eq!(result.verdict(), Verdict::Inconclusive);
            assert!(result.detail().contains("cannot connect to control address"));
        }
    }

    #[tokio::test]
    async fn failing_control_request_is_inconclusive() {
        let net = FakeNetwork::unblocked().with_fetch(DECOY, Err(TransportError::TimedOut));
        let result = run(&net).await;
        assert_eq!(result.verdict(), Verdict::Inconclusive);
        assert!(result.detail().contains(DECOY));
    }
}
