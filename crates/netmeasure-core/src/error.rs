use thiserror::Error;

/// Result type alias for measurement runs
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Errors that end or degrade a measurement run
#[derive(Error, Debug)]
pub enum MeasureError {
    /// The connectivity precheck failed; nothing else was measured
    #[error("offline: {endpoint} did not answer with 204 (no Internet access or captive portal)")]
    Offline {
        /// Endpoint used for the precheck
        endpoint: String,
    },

    /// The control host or another piece of test infrastructure is unusable
    #[error("test infrastructure failure: {0}")]
    TestInfrastructure(String),

    /// The domain under test is not a valid DNS name
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl MeasureError {
    /// Returns true if the error aborts the run with the offline exit status
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }
}

/// Transport-level failure categories reported by the network operations.
///
/// Probes classify these into verdicts; the variants are deliberately
/// coarse so a test double can produce every case without sockets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// TCP connection could not be established (refused, unreachable)
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// TCP connection attempt timed out
    #[error("timed out while connecting")]
    ConnectTimeout,

    /// Connected, but the exchange did not finish in time
    #[error("timed out waiting for a response")]
    TimedOut,

    /// TLS handshake reached certificate verification, and the certificate
    /// does not cover the requested name
    #[error("certificate verification failed: not valid for {0}")]
    CertificateNameMismatch(String),

    /// Certificate verification failed for any other reason (chain, expiry, ...)
    #[error("certificate verification failed: {0}")]
    CertificateInvalid(String),

    /// TLS negotiation failed before certificate verification
    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),

    /// Connection reset by peer after some bytes were received
    #[error("connection reset after {0} bytes")]
    ConnectionReset(usize),

    /// Peer closed or reset the connection without sending anything
    #[error("empty response")]
    EmptyResponse,

    /// DNS query failed
    #[error("DNS error: {0}")]
    Dns(String),

    /// HTTP-level failure from a higher level client
    #[error("HTTP error: {0}")]
    Http(String),
}

impl TransportError {
    /// Returns true if the failure happened before a connection existed
    #[must_use]
    pub const fn is_connect_failure(&self) -> bool {
        matches!(self, Self::ConnectFailed(_) | Self::ConnectTimeout)
    }

    /// Returns true for any certificate verification failure
    #[must_use]
    pub const fn is_certificate_error(&self) -> bool {
        matches!(
            self,
            Self::CertificateNameMismatch(_) | Self::CertificateInvalid(_)
        )
    }
}

impl From<TransportError> for MeasureError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Dns(msg) => Self::Dns(msg),
            TransportError::Http(msg) => Self::Http(msg),
            other => Self::TestInfrastructure(other.to_string()),
        }
    }
}
