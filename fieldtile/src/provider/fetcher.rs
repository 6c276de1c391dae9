//! Single-tile fetcher used by the bulk downloader.
//!
//! A fetch succeeds only for a 2xx response whose body is non-empty and is
//! recognisably an image. Transient failures are retried with exponential
//! backoff; anything else fails at once. Failures never abort the caller:
//! [`TileFetcher::fetch_tile`] logs them and yields `None`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::http::AsyncHttpClient;
use super::template::TileUrlTemplate;
use super::types::{HttpResponse, ProviderError};
use crate::coord::TileKey;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default delay before the first retry.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// How transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * 2^n`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

/// Downloads individual tiles from the remote server.
pub struct TileFetcher<C: AsyncHttpClient> {
    client: Arc<C>,
    template: TileUrlTemplate,
    retry: RetryPolicy,
}

impl<C: AsyncHttpClient> TileFetcher<C> {
    pub fn new(client: Arc<C>, template: TileUrlTemplate) -> Self {
        Self {
            client,
            template,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch a tile, logging and swallowing any failure.
    pub async fn fetch_tile(&self, key: &TileKey) -> Option<Vec<u8>> {
        match self.try_fetch(key).await {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key = %key, error = %e, "Tile fetch failed");
                None
            }
        }
    }

    /// Fetch a tile, returning the last error if every attempt fails.
    ///
    /// Each attempt picks a fresh subdomain.
    pub async fn try_fetch(&self, key: &TileKey) -> Result<Vec<u8>, ProviderError> {
        let mut attempt = 0;
        loop {
            let url = self.template.url_for(key);
            let result = match self.client.get(&url).await {
                Ok(response) => validate_tile(&url, response),
                Err(e) => Err(e),
            };

            match result {
                Ok(data) => {
                    debug!(key = %key, bytes = data.len(), attempt, "Tile fetched");
                    return Ok(data);
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    debug!(
                        key = %key,
                        error = %e,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient tile fetch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Accept a response only if it carries a non-empty image.
fn validate_tile(url: &str, response: HttpResponse) -> Result<Vec<u8>, ProviderError> {
    if let Some(content_type) = &response.content_type {
        if !content_type.trim_start().to_ascii_lowercase().starts_with("image/") {
            return Err(ProviderError::UnexpectedContentType {
                content_type: content_type.clone(),
                url: url.to_string(),
            });
        }
    }

    if response.body.is_empty() {
        return Err(ProviderError::EmptyBody {
            url: url.to_string(),
        });
    }

    image::guess_format(&response.body)
        .map_err(|e| ProviderError::InvalidImage(format!("{} ({})", e, url)))?;

    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::{png_bytes, MockAsyncHttpClient};

    fn key() -> TileKey {
        TileKey::new(13, 4093, 2723).unwrap()
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    fn fetcher(
        client: MockAsyncHttpClient,
    ) -> (Arc<MockAsyncHttpClient>, TileFetcher<MockAsyncHttpClient>) {
        let client = Arc::new(client);
        let fetcher = TileFetcher::new(Arc::clone(&client), TileUrlTemplate::default())
            .with_retry_policy(fast_retry(2));
        (client, fetcher)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let (client, fetcher) = fetcher(MockAsyncHttpClient::serving_png());

        assert_eq!(fetcher.fetch_tile(&key()).await, Some(png_bytes()));
        assert_eq!(client.call_count(), 1);

        let url = &client.requested_urls()[0];
        assert!(url.ends_with(".tile.openstreetmap.org/13/4093/2723.png"));
    }

    #[tokio::test]
    async fn test_not_found_fails_without_retry() {
        let (client, fetcher) = fetcher(MockAsyncHttpClient::new(Err(ProviderError::HttpStatus {
            status: 404,
            url: "u".into(),
        })));

        assert_eq!(fetcher.fetch_tile(&key()).await, None);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let client = MockAsyncHttpClient::serving_png()
            .then(Err(ProviderError::HttpStatus {
                status: 503,
                url: "u".into(),
            }))
            .then(Err(ProviderError::HttpError("connection reset".into())));
        let (client, fetcher) = fetcher(client);

        assert_eq!(fetcher.fetch_tile(&key()).await, Some(png_bytes()));
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (client, fetcher) = fetcher(MockAsyncHttpClient::new(Err(ProviderError::HttpError(
            "timeout".into(),
        ))));

        let err = fetcher.try_fetch(&key()).await.unwrap_err();
        assert!(matches!(err, ProviderError::HttpError(_)));
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_no_retry_policy_makes_one_attempt() {
        let client = Arc::new(MockAsyncHttpClient::new(Err(ProviderError::HttpError(
            "timeout".into(),
        ))));
        let fetcher = TileFetcher::new(Arc::clone(&client), TileUrlTemplate::default())
            .with_retry_policy(RetryPolicy::none());

        assert_eq!(fetcher.fetch_tile(&key()).await, None);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_body_rejected() {
        let (_client, fetcher) = fetcher(MockAsyncHttpClient::new(Ok(HttpResponse::new(
            Vec::new(),
            Some("image/png".into()),
        ))));

        assert!(matches!(
            fetcher.try_fetch(&key()).await,
            Err(ProviderError::EmptyBody { .. })
        ));
    }

    #[tokio::test]
    async fn test_html_error_page_rejected() {
        let (_client, fetcher) = fetcher(MockAsyncHttpClient::new(Ok(HttpResponse::new(
            b"<html>rate limited</html>".to_vec(),
            Some("text/html; charset=utf-8".into()),
        ))));

        assert!(matches!(
            fetcher.try_fetch(&key()).await,
            Err(ProviderError::UnexpectedContentType { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_image_body_rejected() {
        let (_client, fetcher) = fetcher(MockAsyncHttpClient::new(Ok(HttpResponse::new(
            b"definitely not an image".to_vec(),
            None,
        ))));

        assert!(matches!(
            fetcher.try_fetch(&key()).await,
            Err(ProviderError::InvalidImage(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_content_type_accepted_for_image_body() {
        let (_client, fetcher) = fetcher(MockAsyncHttpClient::new(Ok(HttpResponse::new(
            png_bytes(),
            None,
        ))));
        assert!(fetcher.try_fetch(&key()).await.is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }
}
