//! Plaintext HTTP operations.

use async_trait::async_trait;
use netmeasure_core::{HttpTransport, RawHttpResponse, TransportError, TransportResult};
use std::net::{IpAddr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{connect, from_reqwest, is_teardown};
use crate::NetClient;

const HTTP_PORT: u16 = 80;

/// Upper bound on how much of a response is kept for comparison
const MAX_RESPONSE_BYTES: usize = 256 * 1024;

#[async_trait]
impl HttpTransport for NetClient {
    async fn status(&self, url: &str) -> TransportResult<u16> {
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| from_reqwest(&e))?;

        let status = response.status().as_u16();
        debug!(url = %url, status, "GET response");
        Ok(status)
    }

    async fn fetch_raw(&self, addr: IpAddr, host: &str) -> TransportResult<RawHttpResponse> {
        let timeout = self.inner.config.http_timeout;
        let target = SocketAddr::new(addr, HTTP_PORT);
        debug!(addr = %target, host = %host, "raw HTTP request");

        let mut stream = connect(target, timeout).await?;
        let request = build_request(host, self.user_agent());

        let raw = tokio::time::timeout(timeout, exchange(&mut stream, request.as_bytes()))
            .await
            .map_err(|_| TransportError::TimedOut)??;

        debug!(addr = %target, host = %host, bytes = raw.len(), "raw HTTP response");
        RawHttpResponse::parse(&raw).ok_or(TransportError::EmptyResponse)
    }
}

fn build_request(host: &str, user_agent: &str) -> String {
    format!(
        "GET / HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: {user_agent}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\r\n"
    )
}

/// Write the request and read until the peer closes, keeping track of how
/// much arrived before any reset.
async fn exchange(stream: &mut TcpStream, request: &[u8]) -> TransportResult<Vec<u8>> {
    if let Err(e) = stream.write_all(request).await {
        return Err(if is_teardown(&e) {
            TransportError::EmptyResponse
        } else {
            TransportError::Http(e.to_string())
        });
    }

    let mut received = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                received.extend_from_slice(&chunk[..n]);
                if received.len() >= MAX_RESPONSE_BYTES {
                    break;
                }
            }
            Err(e) if is_teardown(&e) => {
                return Err(if received.is_empty() {
                    TransportError::EmptyResponse
                } else {
                    TransportError::ConnectionReset(received.len())
                });
            }
            Err(e) => return Err(TransportError::Http(e.to_string())),
        }
    }

    if received.is_empty() {
        return Err(TransportError::EmptyResponse);
    }
    Ok(received)
}
