//! Sending one query to one nameserver.

use crate::TransportError;
use async_trait::async_trait;
use rootwalk_proto::{Message, UDP_RECV_BUFFER_SIZE};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

/// A single query/response exchange.
///
/// Implementations must tell a timeout apart from a malformed datagram and
/// from a network-level failure, and must return only a response that
/// belongs to `query`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `query` to `server` and waits at most `timeout` for the reply.
    async fn send(
        &self,
        query: &Message,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<Message, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        query: &Message,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<Message, TransportError> {
        (**self).send(query, server, timeout).await
    }
}

/// Plain DNS over UDP, one ephemeral socket per exchange.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    bind: SocketAddr,
}

impl UdpTransport {
    /// Creates a transport binding to an ephemeral IPv4 port.
    pub fn new() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        }
    }

    /// Creates a transport binding to a specific local address.
    pub fn with_bind(bind: SocketAddr) -> Self {
        Self { bind }
    }

    async fn exchange(&self, query: &Message, server: SocketAddr) -> Result<Vec<u8>, TransportError> {
        let socket = UdpSocket::bind(self.bind).await?;
        socket.connect(server).await?;
        socket.send(&query.to_wire()).await?;

        let mut buf = vec![0u8; UDP_RECV_BUFFER_SIZE];
        let len = socket.recv(&mut buf).await?;
        buf.truncate(len);
        Ok(buf)
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(
        &self,
        query: &Message,
        server: SocketAddr,
        limit: Duration,
    ) -> Result<Message, TransportError> {
        let wire = timeout(limit, self.exchange(query, server))
            .await
            .map_err(|_| TransportError::Timeout(limit))??;
        trace!(server = %server, bytes = wire.len(), "Received datagram");

        let response = Message::parse(&wire)?;
        if !response.is_response() {
            return Err(TransportError::Malformed("QR bit not set".into()));
        }
        response.check_answers(query)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootwalk_proto::{Name, Question, ResourceRecord};
    use std::str::FromStr;

    async fn local_server() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    fn query() -> Message {
        Message::iterative_query(Question::a(Name::from_str("example.com").unwrap()))
    }

    #[tokio::test]
    async fn test_udp_exchange() {
        let (server, addr) = local_server().await;
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            let query = Message::parse(&buf[..len]).unwrap();
            let mut response = Message::response_to(&query);
            response.add_answer(ResourceRecord::a(
                Name::from_str("example.com").unwrap(),
                300,
                Ipv4Addr::new(93, 184, 216, 34),
            ));
            server.send_to(&response.to_wire(), peer).await.unwrap();
        });

        let transport = UdpTransport::with_bind("127.0.0.1:0".parse().unwrap());
        let response = transport
            .send(&query(), addr, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(response.answers().len(), 1);
    }

    #[tokio::test]
    async fn test_udp_timeout() {
        let (_server, addr) = local_server().await;
        let transport = UdpTransport::with_bind("127.0.0.1:0".parse().unwrap());
        let err = transport
            .send(&query(), addr, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_udp_mismatched_id_is_malformed() {
        let (server, addr) = local_server().await;
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            let query = Message::parse(&buf[..len]).unwrap();
            let mut response = Message::response_to(&query);
            response.set_id(query.id().wrapping_add(1));
            server.send_to(&response.to_wire(), peer).await.unwrap();
        });

        let transport = UdpTransport::with_bind("127.0.0.1:0".parse().unwrap());
        let err = transport
            .send(&query(), addr, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_udp_garbage_is_malformed() {
        let (server, addr) = local_server().await;
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&[0xde, 0xad], peer).await.unwrap();
        });

        let transport = UdpTransport::with_bind("127.0.0.1:0".parse().unwrap());
        let err = transport
            .send(&query(), addr, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert_eq!(err.label(), "malformed");
    }
}
