use crate::utils::{measure_time, CheckError, CheckResult, Result, Target};
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::time::{Duration, Instant};

pub mod resolve;
pub mod tcp;
pub mod udp;

pub use resolve::*;

/// A configured connectivity check.
///
/// Implementations are immutable once built; `check` may be called any number
/// of times and only performs outbound network I/O.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self) -> CheckResult;

    /// What this checker points at, for rendering.
    fn target(&self) -> Target;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
        }
    }
}

/// Raw TCP/UDP reachability check against `host:port`.
///
/// A TCP success means the handshake completed. A UDP success only means the
/// name resolved, the local socket accepted the destination and no ICMP
/// rejection came back within the listen window; it never proves a remote
/// process received the datagram.
#[derive(Debug, Clone)]
pub struct TransportChecker {
    host: String,
    port: u16,
    protocol: Protocol,
    timeout: Duration,
}

impl TransportChecker {
    pub fn new(host: impl Into<String>, port: u16, protocol: Protocol) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
            timeout: Duration::from_secs(3),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn connect(&self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        let ips = resolve_host(&self.host, self.timeout).await?;
        log::info!(
            "{} check: {} resolved to {:?}",
            self.protocol,
            self.host,
            ips
        );

        match self.protocol {
            Protocol::Tcp => self.test_tcp(&ips, deadline).await,
            Protocol::Udp => self.test_udp(&ips, deadline).await,
        }
    }
}

#[async_trait]
impl Checker for TransportChecker {
    async fn check(&self) -> CheckResult {
        let target = self.target();
        let (duration, result) = measure_time(|| self.connect()).await;

        match result {
            Ok(details) => CheckResult::new(target).success(duration, details),
            Err(error) => {
                log::debug!("{} check to {} failed: {}", self.protocol, target, error);
                CheckResult::new(target).failure(duration, error)
            }
        }
    }

    fn target(&self) -> Target {
        Target::Transport {
            protocol: self.protocol,
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Maps a socket-level I/O error onto the check taxonomy.
pub(crate) fn classify_io(error: io::Error, timeout: Duration) -> CheckError {
    match error.kind() {
        io::ErrorKind::TimedOut => CheckError::Timeout(timeout),
        _ => CheckError::ConnectionFailed(error),
    }
}
