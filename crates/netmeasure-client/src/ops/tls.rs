//! TLS handshakes against a pinned address.

use async_trait::async_trait;
use netmeasure_core::{MeasureError, TlsTransport, TransportError, TransportResult};
use rustls::pki_types::ServerName;
use rustls::{CertificateError, RootCertStore};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use super::{connect, is_teardown};
use crate::NetClient;

const TLS_PORT: u16 = 443;

/// Verifying client configuration with the webpki root set
pub(crate) fn client_config() -> netmeasure_core::Result<Arc<rustls::ClientConfig>> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| MeasureError::Internal(format!("TLS configuration: {e}")))?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(Arc::new(config))
}

#[async_trait]
impl TlsTransport for NetClient {
    async fn handshake(&self, addr: IpAddr, server_name: &str) -> TransportResult<()> {
        let timeout = self.inner.config.http_timeout;
        let target = SocketAddr::new(addr, TLS_PORT);

        let name = ServerName::try_from(server_name.to_string()).map_err(|e| {
            TransportError::TlsHandshake(format!("invalid server name '{server_name}': {e}"))
        })?;

        debug!(addr = %target, sni = %server_name, "TLS handshake");
        let tcp = connect(target, timeout).await?;

        match handshake_over(self.inner.tls.clone(), tcp, name, timeout).await {
            Ok(()) => {
                debug!(addr = %target, sni = %server_name, "TLS handshake complete");
                Ok(())
            }
            Err(HandshakeFailure::TimedOut) => Err(TransportError::TimedOut),
            Err(HandshakeFailure::Io { error, received }) => {
                let err = classify(&error, server_name, received);
                debug!(
                    addr = %target,
                    sni = %server_name,
                    received,
                    error = %err,
                    "TLS handshake failed"
                );
                Err(err)
            }
        }
    }
}

enum HandshakeFailure {
    TimedOut,
    Io { error: io::Error, received: usize },
}

/// Run the client handshake on an open connection, counting the bytes the
/// peer sent before any failure.
async fn handshake_over(
    config: Arc<rustls::ClientConfig>,
    tcp: TcpStream,
    name: ServerName<'static>,
    timeout: Duration,
) -> Result<(), HandshakeFailure> {
    let received = Arc::new(AtomicUsize::new(0));
    let stream = CountingStream {
        inner: tcp,
        received: received.clone(),
    };
    let connector = TlsConnector::from(config);

    match tokio::time::timeout(timeout, connector.connect(name, stream)).await {
        Err(_) => Err(HandshakeFailure::TimedOut),
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(error)) => Err(HandshakeFailure::Io {
            error,
            received: received.load(Ordering::Relaxed),
        }),
    }
}

/// Stream wrapper that tallies bytes read from the peer
struct CountingStream<S> {
    inner: S,
    received: Arc<AtomicUsize>,
}

impl<S: AsyncRead + Unpin> AsyncRead for CountingStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            self.received
                .fetch_add(buf.filled().len() - before, Ordering::Relaxed);
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for CountingStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Sort a handshake failure into the transport taxonomy.
///
/// tokio-rustls wraps protocol errors in `io::Error`; anything that is not a
/// wrapped `rustls::Error` is a socket-level failure. A teardown is only an
/// empty response when nothing at all arrived.
fn classify(err: &io::Error, server_name: &str, received: usize) -> TransportError {
    let tls_error = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>());

    match tls_error {
        Some(rustls::Error::InvalidCertificate(
            CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. },
        )) => TransportError::CertificateNameMismatch(server_name.to_string()),
        Some(rustls::Error::InvalidCertificate(other)) => {
            TransportError::CertificateInvalid(format!("{other:?}"))
        }
        Some(other) => TransportError::TlsHandshake(other.to_string()),
        None if is_teardown(err) && received == 0 => TransportError::EmptyResponse,
        None if is_teardown(err) => TransportError::ConnectionReset(received),
        None => TransportError::TlsHandshake(err.to_string()),
    }
}
