//! HTTP checks routed through a forward proxy taken from the environment.
//!
//! Kept in its own test binary because it sets process-wide proxy variables.

use conncheck::network::Checker;
use conncheck::HttpChecker;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_proxy_resolves_host_the_client_cannot() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&proxy)
        .await;

    for var in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
        std::env::set_var(var, proxy.uri());
    }
    for var in ["NO_PROXY", "no_proxy"] {
        std::env::remove_var(var);
    }

    let checker = HttpChecker::new("internal-only.invalid", "/health", None, false)
        .with_timeout(Duration::from_secs(3));
    let result = checker.check().await;

    assert!(result.success, "proxied check should succeed: {:?}", result.error);
    assert_eq!(result.status, Some(200));
    assert_eq!(
        result.details.as_deref(),
        Some("http://internal-only.invalid/health")
    );

    let received = proxy.received_requests().await.unwrap();
    assert_eq!(received.len(), 1, "the proxy should see exactly one request");
}
