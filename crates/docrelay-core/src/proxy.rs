//! Retrying single-document passthrough.
//!
//! Timeouts and transport errors are retried with backoff; a non-success
//! HTTP response from the backend is terminal. On success the caller
//! relays the binary body and headers unchanged.

use tracing::{debug, warn};

use crate::error::{FetchError, ProxyError};
use crate::fetch::{FetchRequest, FetchResponse, HttpFetch};
use crate::retry::RetryPolicy;

/// Accept header for binary document fetches.
pub const PROXY_ACCEPT: &str = "application/pdf,application/octet-stream,text/*";

pub async fn proxy_fetch<F: HttpFetch>(
    fetch: &F,
    policy: &RetryPolicy,
    url: &str,
    accept: &str,
) -> Result<FetchResponse, ProxyError> {
    let mut attempt = 0u32;
    loop {
        let request =
            FetchRequest::new(url, policy.timeout_for(attempt)).with_accept(accept);
        match fetch.fetch(request).await {
            Ok(response) if response.is_ok() => {
                debug!(url, attempt = attempt + 1, status = response.status, "proxy fetch succeeded");
                return Ok(response);
            }
            Ok(response) => {
                warn!(url, status = response.status, "backend rejected proxy fetch");
                return Err(ProxyError::Status {
                    status: response.status,
                });
            }
            Err(error) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    warn!(url, attempts = attempt, error = %error, "proxy fetch exhausted retries");
                    return Err(ProxyError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
                let delay = policy.delay_before(attempt);
                warn!(
                    url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "proxy fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Classification helper for routes that want to log the failure class.
pub fn is_timeout(error: &FetchError) -> bool {
    matches!(error, FetchError::Timeout)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_util::{canned, FakeFetch};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_timeout: Duration::from_secs(1),
            max_timeout: Duration::from_secs(1),
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    const URL: &str = "https://backend.test/api/documents/view/report.pdf";

    #[tokio::test]
    async fn success_passes_body_through() {
        let fetch = FakeFetch::new();
        fetch.respond(URL, canned::ok_body("application/pdf", None, b"%PDF-1.7"));

        let response = proxy_fetch(&fetch, &fast_policy(5), URL, PROXY_ACCEPT)
            .await
            .expect("proxy fetch");
        assert_eq!(response.body, b"%PDF-1.7");
        assert_eq!(response.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(fetch.calls_to(URL), 1);
    }

    #[tokio::test]
    async fn non_ok_status_fails_fast() {
        let fetch = FakeFetch::new();
        fetch.respond(URL, canned::status(503));

        let error = proxy_fetch(&fetch, &fast_policy(5), URL, PROXY_ACCEPT)
            .await
            .expect_err("should fail");
        assert!(matches!(error, ProxyError::Status { status: 503 }));
        assert_eq!(error.http_status(), 503);
        assert_eq!(fetch.calls_to(URL), 1);
    }

    #[tokio::test]
    async fn timeouts_retry_then_exhaust() {
        let fetch = FakeFetch::new();
        fetch.respond(URL, canned::timeout());

        let error = proxy_fetch(&fetch, &fast_policy(3), URL, PROXY_ACCEPT)
            .await
            .expect_err("should exhaust");
        match error {
            ProxyError::Exhausted { attempts, ref last } => {
                assert_eq!(attempts, 3);
                assert!(is_timeout(last));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(error.http_status(), 504);
        assert_eq!(fetch.calls_to(URL), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_timeout() {
        let fetch = FakeFetch::new();
        fetch.respond(URL, canned::timeout());
        fetch.respond(URL, canned::ok_body("application/pdf", None, b"%PDF-1.7"));

        let response = proxy_fetch(&fetch, &fast_policy(5), URL, PROXY_ACCEPT)
            .await
            .expect("proxy fetch");
        assert_eq!(response.body, b"%PDF-1.7");
        assert_eq!(fetch.calls_to(URL), 2);
    }
}
