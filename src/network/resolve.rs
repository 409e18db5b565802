use crate::utils::{CheckError, Result};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;

/// Parses `host` as an IP literal, accepting bracketed IPv6 (`[::1]`).
pub fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse().ok()
}

/// Resolves `host` to its addresses within `limit`.
///
/// Every failure here, including running out of time, is a resolution failure.
pub async fn resolve_host(host: &str, limit: Duration) -> Result<Vec<IpAddr>> {
    if let Some(ip) = parse_ip_literal(host) {
        return Ok(vec![ip]);
    }

    let (config, mut opts) = match system_conf::read_system_conf() {
        Ok((config, opts)) => (config, opts),
        Err(e) => {
            log::warn!("Could not read system DNS config ({e}), using default");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.timeout = limit;
    opts.attempts = 1;

    let resolver = TokioAsyncResolver::tokio(config, opts);

    let lookup = timeout(limit, resolver.lookup_ip(host))
        .await
        .map_err(|_| CheckError::Resolution(format!("lookup of {host} timed out")))?
        .map_err(|e| CheckError::Resolution(e.to_string()))?;

    let ips: Vec<IpAddr> = lookup.iter().collect();
    if ips.is_empty() {
        return Err(CheckError::Resolution(format!("no addresses found for {host}")));
    }
    Ok(ips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorKind;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_ip_literal() {
        assert_eq!(
            parse_ip_literal("127.0.0.1"),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(parse_ip_literal("::1"), Some(IpAddr::V6(Ipv6Addr::LOCALHOST)));
        assert_eq!(
            parse_ip_literal("[::1]"),
            Some(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );
        assert_eq!(parse_ip_literal("example.com"), None);
        assert_eq!(parse_ip_literal("[example.com]"), None);
    }

    #[tokio::test]
    async fn test_resolve_literal_skips_lookup() {
        let ips = resolve_host("10.1.2.3", Duration::from_millis(1)).await.unwrap();
        assert_eq!(ips, vec![IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))]);
    }

    #[tokio::test]
    async fn test_resolve_invalid_tld_fails() {
        let error = resolve_host("nonexistent.invalid", Duration::from_secs(3))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Resolution);
    }
}
