use super::{classify_io, TransportChecker};
use crate::utils::{remaining, CheckError, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::time::timeout;

impl TransportChecker {
    /// Completes a TCP handshake with the first reachable address in `ips`.
    ///
    /// The stream is dropped as soon as both endpoints are known.
    pub async fn test_tcp(&self, ips: &[IpAddr], deadline: Instant) -> Result<String> {
        let addrs: Vec<SocketAddr> = ips.iter().map(|ip| SocketAddr::new(*ip, self.port)).collect();
        let budget = remaining(deadline).ok_or(CheckError::Timeout(self.timeout))?;

        let stream = timeout(budget, TcpStream::connect(addrs.as_slice()))
            .await
            .map_err(|_| CheckError::Timeout(self.timeout))?
            .map_err(|e| classify_io(e, self.timeout))?;

        let local_addr = stream.local_addr().map_err(CheckError::ConnectionFailed)?;
        let peer_addr = stream.peer_addr().map_err(CheckError::ConnectionFailed)?;

        Ok(format!(
            "TCP connection successful: {} -> {}",
            local_addr, peer_addr
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::network::{Checker, Protocol, TransportChecker};
    use crate::utils::ErrorKind;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_listening_port_succeeds() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let checker = TransportChecker::new("127.0.0.1", port, Protocol::Tcp)
            .with_timeout(Duration::from_secs(2));
        let result = checker.check().await;

        assert!(result.success, "expected success: {:?}", result.error);
        assert!(result.status.is_none());
        assert!(result
            .details
            .unwrap()
            .contains(&format!("127.0.0.1:{port}")));
    }

    #[tokio::test]
    async fn test_tcp_closed_port_is_connection_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let checker = TransportChecker::new("127.0.0.1", port, Protocol::Tcp)
            .with_timeout(Duration::from_secs(2));
        let result = checker.check().await;

        assert!(!result.success);
        assert_eq!(result.error_kind(), Some(ErrorKind::ConnectionFailed));
        assert!(result.status.is_none());
    }
}
