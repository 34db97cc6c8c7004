//! Datagram socket abstraction for pluggable network backends

use std::net::SocketAddr;

use anyhow::Result;
use async_trait::async_trait;

/// A socket that exchanges whole datagrams with remote peers
#[async_trait]
pub trait DatagramSocket: Send + Sync {
    /// Wait for the next datagram, returning its length and sender
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Send one datagram to `target`
    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<usize>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
