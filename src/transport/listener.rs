//! Receive loop: one datagram is dispatched and answered before the next is read

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::CommandDispatcher;
use crate::transport::traits::DatagramSocket;

/// Serve datagrams from `socket` until `shutdown` is cancelled
pub async fn serve<S>(
    socket: &S,
    dispatcher: &CommandDispatcher,
    recv_buffer_size: usize,
    shutdown: CancellationToken,
) -> Result<()>
where
    S: DatagramSocket + ?Sized,
{
    if recv_buffer_size == 0 {
        bail!("receive buffer size must be non-zero");
    }

    let mut buf = vec![0u8; recv_buffer_size];
    info!("[{}] Listening", socket.name());

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => received,
        };

        let (len, sender) = match received {
            Ok(received) => received,
            Err(e) => {
                warn!("[{}] Receive failed: {}", socket.name(), e);
                continue;
            }
        };

        if len == buf.len() {
            warn!(
                "[{}] Datagram from {} filled the {} byte buffer and may be truncated",
                socket.name(),
                sender,
                len
            );
        }

        let datagram = &buf[..len];
        debug!("[{}] RX {} from {}: {}", socket.name(), len, sender, hex(datagram));

        let Some(response) = dispatcher.dispatch(datagram, sender).await else {
            continue;
        };

        let payload = response.into_bytes();
        if let Err(e) = socket.send_to(&payload, sender).await {
            warn!("[{}] Reply to {} dropped: {}", socket.name(), sender, e);
        }
    }

    info!("[{}] Listener stopped", socket.name());
    Ok(())
}

fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_RECV_BUFFER_SIZE;
    use crate::device::{Device, RecordingActuator};
    use crate::scheduler::TimerScheduler;
    use crate::transport::UdpTransport;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use smartlamp_shared::client;
    use smartlamp_shared::codec::TlvWriter;
    use smartlamp_shared::command::on_off;
    use std::collections::VecDeque;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::UdpSocket;

    fn dispatcher() -> (CommandDispatcher, Arc<RecordingActuator>) {
        let actuator = Arc::new(RecordingActuator::new());
        let device = Device::new(actuator.clone());
        let scheduler = TimerScheduler::new(device.clone());
        (CommandDispatcher::new(device, scheduler), actuator)
    }

    async fn exchange(peer: &UdpSocket, target: SocketAddr, request: &[u8]) -> Vec<u8> {
        peer.send_to(request, target).await.unwrap();
        let mut buf = [0u8; 256];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), peer.recv_from(&mut buf))
            .await
            .expect("no reply")
            .unwrap();
        buf[..len].to_vec()
    }

    #[tokio::test]
    async fn test_udp_loopback() {
        let (dispatcher, actuator) = dispatcher();
        let socket = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let target = socket.local_addr().unwrap();
        let shutdown = CancellationToken::new();

        let task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { serve(&socket, &dispatcher, 1280, shutdown).await })
        };

        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let reply = exchange(&peer, target, &client::on_off(on_off::ON)).await;
        assert!(client::is_ack(&reply));
        assert_eq!(actuator.writes(), vec![127]);

        // Unmatched datagrams get no reply, so the next reply belongs to the next request
        peer.send_to(b"\xFF\x00", target).await.unwrap();
        let reply = exchange(&peer, target, &client::basic_info_request()).await;
        let info = client::decode_basic_info(&reply).unwrap();
        assert_eq!(info.vendor_id, 0xFFF1);

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_datagram_longer_than_an_mtu_is_read_whole() {
        let (dispatcher, actuator) = dispatcher();
        let socket = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let target = socket.local_addr().unwrap();
        let shutdown = CancellationToken::new();

        let task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                serve(&socket, &dispatcher, DEFAULT_RECV_BUFFER_SIZE, shutdown).await
            })
        };

        // The addressing records sit past the first 1280 bytes
        let mut writer = TlvWriter::new();
        for _ in 0..500 {
            writer.put_uint8(7, 0);
        }
        let mut datagram = writer.take().to_vec();
        datagram.extend_from_slice(&client::on_off(on_off::ON));
        assert!(datagram.len() > 1280);

        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let reply = exchange(&peer, target, &datagram).await;
        assert!(client::is_ack(&reply));
        assert_eq!(actuator.writes(), vec![127]);

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    /// Scripted socket whose sends always fail
    struct ScriptedSocket {
        inbound: Mutex<VecDeque<Result<Vec<u8>, String>>>,
        send_attempts: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl DatagramSocket for ScriptedSocket {
        async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
            let next = self.inbound.lock().unwrap().pop_front();
            match next {
                Some(Ok(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok((data.len(), "10.0.0.2:6000".parse().unwrap()))
                }
                Some(Err(e)) => Err(anyhow!(e)),
                None => std::future::pending().await,
            }
        }

        async fn send_to(&self, data: &[u8], _target: SocketAddr) -> Result<usize> {
            self.send_attempts.lock().unwrap().push(data.to_vec());
            Err(anyhow!("network unreachable"))
        }

        fn name(&self) -> &'static str {
            "SCRIPTED"
        }
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_the_loop() {
        let (dispatcher, actuator) = dispatcher();
        let socket = Arc::new(ScriptedSocket {
            inbound: Mutex::new(VecDeque::from(vec![
                Err("connection reset".to_string()),
                Ok(client::on_off(on_off::ON).to_vec()),
                Ok(client::move_to_level(33).to_vec()),
            ])),
            send_attempts: Mutex::new(Vec::new()),
        });
        let shutdown = CancellationToken::new();

        let task = {
            let socket = socket.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { serve(socket.as_ref(), &dispatcher, 64, shutdown).await })
        };

        for _ in 0..100 {
            if socket.send_attempts.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(
            *socket.send_attempts.lock().unwrap(),
            vec![b"ACK".to_vec(), b"ACK".to_vec()]
        );
        assert_eq!(actuator.writes(), vec![127, 33]);

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_zero_buffer_rejected() {
        let (dispatcher, _) = dispatcher();
        let socket = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let result = serve(&socket, &dispatcher, 0, CancellationToken::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x04, 0x01, 0xAB]), "04 01 AB");
        assert_eq!(hex(&[]), "");
    }
}
