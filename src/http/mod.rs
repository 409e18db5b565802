//! HTTP(S) reachability checks.
//!
//! [`HttpChecker`] issues a single GET and separates protocol-level failures
//! (an error status came back) from network-level ones (nothing usable came
//! back at all).
//!
//! # Examples
//!
//! ```rust,no_run
//! use conncheck::http::HttpChecker;
//! use conncheck::network::Checker;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let checker = HttpChecker::new("example.com", "/health", None, true)
//!         .with_timeout(Duration::from_secs(5));
//!     assert_eq!(checker.url(), "https://example.com/health");
//!
//!     let result = checker.check().await;
//!     println!("{} {:?}", result.success, result.status);
//! }
//! ```
//!
//! # Redirects and proxies
//!
//! Redirects are followed up to [`DEFAULT_MAX_REDIRECTS`] hops unless
//! [`HttpChecker::with_max_redirects`] says otherwise; going past the limit is
//! a network failure. Proxy environment variables (`HTTP_PROXY`,
//! `HTTPS_PROXY`, `ALL_PROXY`, `NO_PROXY`) are honored unless
//! [`HttpChecker::with_env_proxy`] turns them off. The target host is only
//! resolved when the request goes to it directly; behind a proxy the proxy
//! does the lookup.

use crate::network::Checker;
use crate::utils::{error_chain, measure_time, CheckError, CheckResult, Target};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

mod dns;

use dns::HickoryDns;

pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Builds the URL an [`HttpChecker`] requests.
///
/// `scheme://host[:port]` followed by `endpoint` verbatim. IPv6 literals are
/// bracketed; every other host is used as given.
pub fn build_url(host: &str, endpoint: &str, port: Option<u16>, secure: bool) -> String {
    let scheme = if secure { "https" } else { "http" };
    let host = match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("[{v6}]"),
        _ => host.to_string(),
    };

    match port {
        Some(port) => format!("{scheme}://{host}:{port}{endpoint}"),
        None => format!("{scheme}://{host}{endpoint}"),
    }
}

#[derive(Debug, Clone)]
pub struct HttpChecker {
    host: String,
    endpoint: String,
    port: Option<u16>,
    secure: bool,
    url: String,
    timeout: Duration,
    max_redirects: usize,
    env_proxy: bool,
}

impl HttpChecker {
    pub fn new(
        host: impl Into<String>,
        endpoint: impl Into<String>,
        port: Option<u16>,
        secure: bool,
    ) -> Self {
        let host = host.into();
        let endpoint = endpoint.into();
        let url = build_url(&host, &endpoint, port, secure);
        Self {
            host,
            endpoint,
            port,
            secure,
            url,
            timeout: Duration::from_secs(3),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            env_proxy: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum redirect hops to follow. `0` reports the first 3xx as-is.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Whether proxy environment variables apply to the request.
    pub fn with_env_proxy(mut self, enabled: bool) -> Self {
        self.env_proxy = enabled;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self) -> Result<Client, CheckError> {
        let policy = if self.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(self.max_redirects)
        };

        let mut builder = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("conncheck/", env!("CARGO_PKG_VERSION")))
            .redirect(policy)
            .dns_resolver(Arc::new(HickoryDns::for_deadline(self.timeout)));
        if !self.env_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| CheckError::Network(format!("Failed to create HTTP client: {}", e)))
    }

    /// Sends the request and returns `(status, final url)` on a non-error status.
    async fn request(&self) -> Result<(u16, String), CheckError> {
        let client = self.client()?;

        log::debug!("HTTP check requesting {}", self.url);
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        log::debug!("HTTP check to {} returned status {}", final_url, status);

        if status.is_client_error() || status.is_server_error() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            return Err(CheckError::HttpStatus {
                status: status.as_u16(),
                reason,
            });
        }

        Ok((status.as_u16(), final_url))
    }

    fn classify(&self, error: &reqwest::Error) -> CheckError {
        if let Some(message) = dns::resolution_failure(error) {
            return CheckError::Resolution(message);
        }
        if error.is_timeout() {
            return CheckError::Timeout(self.timeout);
        }
        if error.is_redirect() {
            return CheckError::Network(format!(
                "too many redirects (limit {}): {}",
                self.max_redirects,
                error_chain(error)
            ));
        }
        CheckError::Network(error_chain(error))
    }
}

#[async_trait]
impl Checker for HttpChecker {
    async fn check(&self) -> CheckResult {
        let target = self.target();
        let (duration, result) = measure_time(|| self.request()).await;

        match result {
            Ok((status, final_url)) => CheckResult::new(target)
                .with_status(status)
                .success(duration, final_url),
            Err(error) => {
                log::debug!("HTTP check to {} failed: {}", self.url, error);
                CheckResult::new(target).failure(duration, error)
            }
        }
    }

    fn target(&self) -> Target {
        Target::Http {
            url: self.url.clone(),
        }
    }
}
