//! UDP transport implementation

use std::net::SocketAddr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::transport::traits::DatagramSocket;

/// UDP socket wrapper implementing DatagramSocket
pub struct UdpTransport {
    inner: UdpSocket,
}

impl UdpTransport {
    pub async fn bind(address: &str) -> Result<Self> {
        let inner = UdpSocket::bind(address)
            .await
            .with_context(|| format!("binding UDP socket on {}", address))?;
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }
}

#[async_trait]
impl DatagramSocket for UdpTransport {
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        Ok(self.inner.recv_from(buf).await?)
    }

    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<usize> {
        Ok(self.inner.send_to(data, target).await?)
    }

    fn name(&self) -> &'static str {
        "UDP"
    }
}
