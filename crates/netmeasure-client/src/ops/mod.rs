//! Network operations, one module per collaborator.
//!
//! Each module implements one of the `netmeasure_core::transport` traits
//! for [`NetClient`](crate::NetClient).

pub(crate) mod dns;
mod doh;
mod http;
mod ipinfo;
pub(crate) mod tls;

pub use dns::rcode_name;

use netmeasure_core::{TransportError, TransportResult};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Open a TCP connection, separating connect timeouts from refusals
pub(crate) async fn connect(addr: SocketAddr, timeout: Duration) -> TransportResult<TcpStream> {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Err(_) => Err(TransportError::ConnectTimeout),
        Ok(Err(e)) => Err(TransportError::ConnectFailed(format!("{addr}: {e}"))),
        Ok(Ok(stream)) => Ok(stream),
    }
}

/// Returns true for errors that mean the peer tore the connection down
pub(crate) fn is_teardown(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

/// Map a reqwest failure onto the transport taxonomy
pub(crate) fn from_reqwest(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::TimedOut
    } else if err.is_connect() {
        TransportError::ConnectFailed(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}
