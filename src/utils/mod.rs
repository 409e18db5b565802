use crate::network::Protocol;
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a check failed.
///
/// Callers branch on this instead of matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The host name could not be resolved to an address.
    Resolution,
    /// The remote refused, reset, or was unreachable.
    ConnectionFailed,
    /// The connection or request did not complete before the deadline.
    Timeout,
    /// A well-formed HTTP response carried an error status.
    HttpStatus,
    /// Any other transport failure during an HTTP attempt.
    Network,
}

impl ErrorKind {
    /// Process exit code used by the CLI for this kind of failure.
    ///
    /// 0 is success and 2 belongs to clap's usage errors.
    pub const fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Resolution => 3,
            ErrorKind::ConnectionFailed => 4,
            ErrorKind::Timeout => 5,
            ErrorKind::HttpStatus => 6,
            ErrorKind::Network => 7,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Resolution => "Resolution",
            ErrorKind::ConnectionFailed => "ConnectionFailed",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::HttpStatus => "HttpStatus",
            ErrorKind::Network => "Network",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("DNS resolution failed: {0}")]
    Resolution(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] std::io::Error),
    #[error("Timed out after {}", format_duration(*.0))]
    Timeout(Duration),
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },
    #[error("Network error: {0}")]
    Network(String),
}

impl CheckError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            CheckError::Resolution(_) => ErrorKind::Resolution,
            CheckError::ConnectionFailed(_) => ErrorKind::ConnectionFailed,
            CheckError::Timeout(_) => ErrorKind::Timeout,
            CheckError::HttpStatus { .. } => ErrorKind::HttpStatus,
            CheckError::Network(_) => ErrorKind::Network,
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;

/// What a check was pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Transport {
        protocol: Protocol,
        host: String,
        port: u16,
    },
    Http {
        url: String,
    },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Transport {
                protocol,
                host,
                port,
            } => match host.parse::<IpAddr>() {
                Ok(IpAddr::V6(_)) => write!(f, "{protocol} [{host}]:{port}"),
                _ => write!(f, "{protocol} {host}:{port}"),
            },
            Target::Http { url } => f.write_str(url),
        }
    }
}

/// Outcome of a single check.
///
/// `error` is set exactly when `success` is false. Results only come out of a
/// [`Checker`](crate::network::Checker); outside the crate there is no way to
/// start an empty one:
///
/// ```compile_fail
/// use conncheck::utils::{CheckResult, Target};
///
/// let result = CheckResult::new(Target::Http { url: "http://example.com/".into() });
/// ```
#[must_use]
#[derive(Debug)]
pub struct CheckResult {
    pub target: Target,
    pub success: bool,
    pub status: Option<u16>,
    pub duration: Duration,
    pub details: Option<String>,
    pub error: Option<CheckError>,
}

impl CheckResult {
    pub(crate) const fn new(target: Target) -> Self {
        Self {
            target,
            success: false,
            status: None,
            duration: Duration::ZERO,
            details: None,
            error: None,
        }
    }

    pub(crate) fn success(mut self, duration: Duration, details: String) -> Self {
        self.success = true;
        self.duration = duration;
        self.details = Some(details);
        self.error = None;
        self
    }

    pub(crate) fn failure(mut self, duration: Duration, error: CheckError) -> Self {
        self.success = false;
        self.duration = duration;
        self.details = Some(match &error {
            CheckError::HttpStatus { reason, .. } => reason.clone(),
            other => other.to_string(),
        });
        if let CheckError::HttpStatus { status, .. } = &error {
            self.status = Some(*status);
        }
        self.error = Some(error);
        self
    }

    pub(crate) fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(CheckError::kind)
    }

    pub fn exit_code(&self) -> i32 {
        match (self.success, self.error_kind()) {
            (true, _) => 0,
            (false, Some(kind)) => kind.exit_code(),
            (false, None) => 1,
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f32())
    }
}

pub async fn measure_time<F, Fut, T>(f: F) -> (Duration, T)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = f().await;
    let duration = start.elapsed();
    (duration, result)
}

/// Time left before `deadline`, or `None` once it has passed.
pub fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
}

/// Joins an error with its source chain, e.g. `a: b: c`.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
