//! HTTP fetcher with retry support.

use crate::types::{HttpConfig, Result, UrlHarvestError};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Source of page and script bodies.
///
/// The scanner only needs GET semantics and the body as text; anything that
/// can produce that (HTTP, a cache, a test fixture) can drive an extraction.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Allowance per attempt for waiting on the rate limiter.
const RATE_LIMIT_SLACK: Duration = Duration::from_secs(1);

/// Pause before the `retry`-th retry.
fn retry_backoff(retry: u32) -> Duration {
    Duration::from_millis(500).saturating_mul(retry)
}

/// Upper bound on one [`HttpFetcher::fetch`] call with `config`.
///
/// Counts every attempt at the full request timeout, the pauses between
/// attempts and some rate limiter slack. Saturates instead of overflowing.
pub fn fetch_budget(config: &HttpConfig) -> Duration {
    let attempts = config.max_retries.saturating_add(1);
    let per_attempt = Duration::from_secs(config.timeout_secs).saturating_add(RATE_LIMIT_SLACK);

    // Sum of retry_backoff(1..=max_retries)
    let retries = u64::from(config.max_retries);
    let steps = retries * (retries + 1) / 2;
    let pauses = Duration::from_millis(steps.saturating_mul(500));

    per_attempt.saturating_mul(attempts).saturating_add(pauses)
}

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Fetcher for pages and scripts with rate limiting and retries.
pub struct HttpFetcher {
    client: Client,
    config: HttpConfig,
    rate_limiter: Arc<DirectRateLimiter>,
}

impl HttpFetcher {
    /// Create a new fetcher.
    pub fn new(config: HttpConfig, rate_limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .http1_only()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Fetch a body, retrying transient failures.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let err = match self.do_fetch(url).await {
                Ok(content) => {
                    debug!("Fetched {} ({} bytes)", url, content.len());
                    return Ok(content);
                }
                Err(e) => e,
            };

            // 4xx won't succeed on retry
            if !is_retryable(&err) {
                debug!("Not retrying {}: {}", url, err);
                return Err(err);
            }

            if retries >= self.config.max_retries {
                if retries > 0 {
                    warn!("Failed to fetch {} after {} retries: {}", url, retries, err);
                } else {
                    debug!("Failed to fetch {}: {}", url, err);
                }
                return Err(err);
            }

            retries += 1;
            trace!("Retry {} for {}: {}", retries, url, err);
            tokio::time::sleep(retry_backoff(retries)).await;
        }
    }

    /// Perform the actual HTTP fetch.
    async fn do_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UrlHarvestError::StatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content = response.text().await?;
        Ok(content)
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String> {
        self.fetch(url).await
    }
}

fn is_retryable(err: &UrlHarvestError) -> bool {
    match err {
        UrlHarvestError::StatusError { status, .. } => !(400..500).contains(status),
        UrlHarvestError::HttpError(http_err) => !http_err.is_builder(),
        _ => true,
    }
}

/// Calculate SHA256 hash of content.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(max_retries: u32) -> HttpFetcher {
        let config = HttpConfig {
            timeout_secs: 5,
            max_retries,
            ..HttpConfig::default()
        };
        HttpFetcher::new(config, 100).unwrap()
    }

    #[test]
    fn test_hash_content() {
        let content = "console.log('hello');";
        let hash = hash_content(content);
        assert_eq!(hash.len(), 64); // SHA256 hex is 64 chars
        assert_eq!(hash, hash_content(content));
    }

    #[test]
    fn test_fetch_budget_covers_backoff() {
        for max_retries in [0, 1, 2, 5, 8, 20] {
            let config = HttpConfig {
                timeout_secs: 1,
                max_retries,
                ..HttpConfig::default()
            };
            let worst = (1..=max_retries).map(retry_backoff).sum::<Duration>()
                + Duration::from_secs(u64::from(max_retries) + 1);
            assert!(
                fetch_budget(&config) >= worst,
                "budget {:?} < worst case {:?} with {} retries",
                fetch_budget(&config),
                worst,
                max_retries
            );
        }
    }

    #[test]
    fn test_fetch_budget_saturates() {
        let config = HttpConfig {
            timeout_secs: u64::MAX,
            max_retries: u32::MAX,
            ..HttpConfig::default()
        };
        assert_eq!(fetch_budget(&config), Duration::MAX);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("var a = 1;"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher(2)
            .get(&format!("{}/app.js", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "var a = 1;");
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.js"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(3)
            .get(&format!("{}/missing.js", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, UrlHarvestError::StatusError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_server_error_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky.js"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = fetcher(1)
            .get(&format!("{}/flaky.js", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, UrlHarvestError::StatusError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let err = fetcher(0).get("http://127.0.0.1:1/none.js").await;
        assert!(err.is_err());
    }
}
