use crate::config::Config;
use crate::feed::listing::{parse_listing, ParseResult};
use crate::feed::types::{FeedQuery, Video};
use futures::StreamExt;
use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Fixed page size for every listing request.
pub const PAGE_SIZE: usize = 100;
const MAX_LISTING_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching one listing page.
///
/// A fetch is never retried here; whatever retry policy the caller wants is
/// layered on top of [`FeedFetcher::fetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body was not a listing envelope
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Base URL cannot carry a listing path
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    /// The fetch task panicked before producing a result
    #[error("Fetch task panicked: {0}")]
    Panicked(String),
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Create a custom redirect policy with loop detection and limited hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Build the shared HTTP client.
///
/// The request timeout lives here; the fetcher itself imposes none.
pub fn build_client(config: &Config) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .user_agent(config.user_agent.as_str())
        .pool_max_idle_per_host(8) // pre-warm fires eight requests at one host
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
        .build()?;
    Ok(client)
}

// ============================================================================
// Feed Fetcher
// ============================================================================

/// Fetches listing pages for one subreddit.
///
/// Cheap to clone: the client is reference counted internally.
#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
    base_url: Url,
    subreddit: Arc<str>,
}

impl FeedFetcher {
    pub fn new(client: reqwest::Client, base_url: Url, subreddit: &str) -> Self {
        Self {
            client,
            base_url,
            subreddit: Arc::from(subreddit),
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Listing endpoint for `query`:
    /// `{base}/r/{subreddit}/{category}/.json?limit=100&t={timeframe}`.
    pub fn listing_url(&self, query: &FeedQuery) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("r").push(&self.subreddit);
            if let Some(category) = query.category.path_segment() {
                segments.push(category);
            }
            segments.push(".json");
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("limit", &PAGE_SIZE.to_string())
            .append_pair("t", query.timeframe_param().as_str());
        Ok(url)
    }

    /// Fetch one listing page and normalise it into videos.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - Connection, TLS or transport timeout
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
    /// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
    /// - [`FetchError::Parse`] - Body is not a listing envelope
    pub async fn fetch(&self, query: &FeedQuery) -> Result<Vec<Video>, FetchError> {
        let url = self.listing_url(query)?;
        tracing::debug!(query = %query, url = %url, "Fetching listing");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_LISTING_SIZE).await?;

        let ParseResult { videos, skipped } =
            parse_listing(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        if skipped > 0 {
            tracing::debug!(
                query = %query,
                kept = videos.len(),
                skipped = skipped,
                "Listing entries without media skipped"
            );
        }

        Ok(videos)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
