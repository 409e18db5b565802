use crate::network::resolve_host;
use crate::utils::{error_chain, CheckError};
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;

/// Resolves request targets through the same hickory lookup the transport
/// checks use.
///
/// Lookup failures are handed to reqwest as a [`CheckError::Resolution`] so
/// they can be recognised again on the way out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HickoryDns {
    limit: Duration,
}

impl HickoryDns {
    /// Lookups get 90% of the request deadline so an exhausted lookup still
    /// surfaces as a resolution failure rather than a request timeout.
    pub(crate) fn for_deadline(deadline: Duration) -> Self {
        Self {
            limit: deadline.mul_f64(0.9),
        }
    }
}

impl Resolve for HickoryDns {
    fn resolve(&self, name: Name) -> Resolving {
        let limit = self.limit;
        Box::pin(async move {
            let ips = resolve_host(name.as_str(), limit).await?;
            // reqwest fills in the port from the URL.
            let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok::<Addrs, Box<dyn StdError + Send + Sync>>(addrs)
        })
    }
}

/// Finds a DNS failure in the source chain of a request error.
pub(crate) fn resolution_failure(error: &reqwest::Error) -> Option<String> {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(CheckError::Resolution(message)) = cause.downcast_ref::<CheckError>() {
            return Some(message.clone());
        }
        // hyper-util's connector labels resolver errors this way.
        if cause.to_string() == "dns error" {
            return Some(error_chain(cause));
        }
        source = cause.source();
    }
    None
}
