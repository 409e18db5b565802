use super::{classify_io, TransportChecker};
use crate::utils::{remaining, CheckError, Result};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;

const PAYLOAD: &[u8] = b"test";
const LISTEN_WINDOW: Duration = Duration::from_millis(100);

impl TransportChecker {
    /// Connects a UDP socket to the first address in `ips` and sends one datagram.
    ///
    /// UDP has no handshake. Success here is local send readiness plus the
    /// absence of an ICMP rejection during a short listen window.
    pub async fn test_udp(&self, ips: &[IpAddr], deadline: Instant) -> Result<String> {
        let ip = ips
            .first()
            .copied()
            .ok_or_else(|| CheckError::Resolution(format!("no addresses found for {}", self.host)))?;
        let addr = SocketAddr::new(ip, self.port);

        let bind_addr = match ip {
            IpAddr::V4(_) => "0.0.0.0:0",
            IpAddr::V6(_) => "[::]:0",
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(CheckError::ConnectionFailed)?;

        socket
            .connect(addr)
            .await
            .map_err(|e| classify_io(e, self.timeout))?;

        let budget = remaining(deadline).ok_or(CheckError::Timeout(self.timeout))?;
        let sent = timeout(budget, socket.send(PAYLOAD))
            .await
            .map_err(|_| CheckError::Timeout(self.timeout))?
            .map_err(|e| classify_io(e, self.timeout))?;

        let window = remaining(deadline).map_or(Duration::ZERO, |left| left.min(LISTEN_WINDOW));
        let mut buf = [0; 1024];

        match timeout(window, socket.recv(&mut buf)).await {
            Ok(Ok(received)) => Ok(format!(
                "UDP test successful: sent {} bytes, received {} bytes from {}",
                sent, received, addr
            )),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                Err(CheckError::ConnectionFailed(e))
            }
            Ok(Err(e)) => {
                log::debug!("UDP receive from {} failed: {}", addr, e);
                Ok(Self::unconfirmed(sent, addr))
            }
            Err(_) => Ok(Self::unconfirmed(sent, addr)),
        }
    }

    fn unconfirmed(sent: usize, addr: SocketAddr) -> String {
        format!(
            "UDP test (send only): sent {} bytes to {} (no response; delivery not confirmed)",
            sent, addr
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::network::{Checker, Protocol, TransportChecker};
    use std::time::Duration;
    use tokio::net::UdpSocket;

    #[tokio::test]
    async fn test_udp_echo_reports_reply() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let mut buf = [0; 64];
            if let Ok((len, peer)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(&buf[..len], peer).await;
            }
        });

        let checker = TransportChecker::new("127.0.0.1", port, Protocol::Udp)
            .with_timeout(Duration::from_secs(2));
        let result = checker.check().await;

        assert!(result.success, "expected success: {:?}", result.error);
        assert!(result.details.unwrap().contains("received 4 bytes"));
    }

    #[tokio::test]
    async fn test_udp_silent_peer_is_unconfirmed_success() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let checker = TransportChecker::new("127.0.0.1", port, Protocol::Udp)
            .with_timeout(Duration::from_secs(2));
        let result = checker.check().await;

        // A bound socket that never answers still counts as reachable; UDP
        // cannot tell us more than that.
        assert!(result.success, "expected success: {:?}", result.error);
        assert!(result.details.unwrap().contains("delivery not confirmed"));
        drop(server);
    }
}
