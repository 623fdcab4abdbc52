//! Transport abstraction and the concrete WebTransport client (spec §6).
//!
//! [`Transport`] keeps the session core agnostic to the network layer;
//! [`SessionController`](crate::session::SessionController) is driven
//! generically over it. The `transport` feature wires in the real
//! `wtransport`-backed client; a fake in-memory transport (see the crate's
//! integration tests) exercises the session logic without a socket.

use crate::net::framing::FramingError;

/// Network I/O seam. The reliable side is message-framed
/// ([`crate::net::framing`]); the unreliable side is one datagram per call.
pub trait Transport: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send_reliable(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
    async fn send_unreliable(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
    async fn recv_reliable(&mut self) -> Result<Vec<u8>, Self::Error>;
    async fn recv_unreliable(&mut self) -> Result<Vec<u8>, Self::Error>;
    async fn close(&mut self);
}

/// A base64 SHA-256 certificate pin, used to trust a self-signed dev
/// certificate without a CA (mirrors the server's `TlsConfig::cert_hash`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPin {
    sha256_base64: String,
}

impl CertPin {
    pub fn from_base64(sha256_base64: impl Into<String>) -> Self {
        Self { sha256_base64: sha256_base64.into() }
    }

    pub fn as_base64(&self) -> &str {
        &self.sha256_base64
    }
}

#[cfg(feature = "transport")]
pub use webtransport_client::{WebTransportClient, WebTransportError};

#[cfg(feature = "transport")]
mod webtransport_client {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use wtransport::ClientConfig;
    use wtransport::Endpoint;

    use super::{CertPin, FramingError, Transport};
    use crate::net::framing::{read_message, write_message};

    #[derive(Debug, thiserror::Error)]
    pub enum WebTransportError {
        #[error("connection error: {0}")]
        Connection(#[from] wtransport::error::ConnectionError),
        #[error("connecting error: {0}")]
        Connecting(#[from] wtransport::error::ConnectingError),
        #[error("send datagram error: {0}")]
        SendDatagram(#[from] wtransport::error::SendDatagramError),
        #[error("framing error: {0}")]
        Framing(#[from] FramingError),
        #[error("invalid certificate pin: {0}")]
        InvalidCertPin(#[from] base64::DecodeError),
        #[error("stream opening error: {0}")]
        StreamOpening(#[from] wtransport::error::StreamOpeningError),
        #[error("io error: {0}")]
        Io(#[from] std::io::Error),
        #[error("certificate pin must decode to exactly 32 bytes")]
        InvalidCertPinLength,
    }

    /// One WebTransport session: a bidirectional stream for reliable
    /// traffic (join, chat, acks) and datagrams for unreliable traffic
    /// (per-tick input, snapshots).
    pub struct WebTransportClient {
        connection: wtransport::Connection,
        send: wtransport::SendStream,
        recv: wtransport::RecvStream,
    }

    impl WebTransportClient {
        pub async fn connect(url: &str, cert_pin: Option<&CertPin>) -> Result<Self, WebTransportError> {
            let builder = ClientConfig::builder().with_bind_default();
            let config = match cert_pin {
                Some(pin) => {
                    let hash = STANDARD.decode(pin.as_base64())?;
                    let hash: [u8; 32] = hash
                        .try_into()
                        .map_err(|_| WebTransportError::InvalidCertPinLength)?;
                    builder
                        .with_server_certificate_hashes([wtransport::tls::Sha256Digest::new(hash)])
                        .build()
                }
                None => builder.with_native_certs().build(),
            };

            let endpoint = Endpoint::client(config)?;
            let connection = endpoint.connect(url).await?;
            let (send, recv) = connection.open_bi().await?.await?;

            Ok(Self { connection, send, recv })
        }
    }

    impl Transport for WebTransportClient {
        type Error = WebTransportError;

        async fn send_reliable(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            write_message(&mut self.send, bytes).await.map_err(Into::into)
        }

        async fn send_unreliable(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            self.connection.send_datagram(bytes)?;
            Ok(())
        }

        async fn recv_reliable(&mut self) -> Result<Vec<u8>, Self::Error> {
            read_message(&mut self.recv).await.map_err(Into::into)
        }

        async fn recv_unreliable(&mut self) -> Result<Vec<u8>, Self::Error> {
            let datagram = self.connection.receive_datagram().await?;
            Ok(datagram.to_vec())
        }

        async fn close(&mut self) {
            self.connection.close(0u32.into(), b"client disconnect");
        }
    }
}
