//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.
//! Request methods do not wait on the limiter themselves; await
//! [`MusicBrainzClient::throttle`] before each one.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::enrichment::domain::{MetadataError, TrackInfo};

/// User agent string - MusicBrainz requires this
pub const USER_AGENT: &str = concat!(
    "RecordCatalog/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/record-catalog)"
);

/// Production endpoint
pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// Search hits fetched per query
const SEARCH_LIMIT: u32 = 5;

/// MusicBrainz client settings
#[derive(Debug, Clone)]
pub struct MusicBrainzConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    /// Minimum spacing between two requests
    pub min_interval: Duration,
    /// Minimum search score (0-100) to accept a release
    pub min_score: u32,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            min_interval: Duration::from_millis(1000),
            min_score: 90,
        }
    }
}

/// Spaces requests at least `min_interval` apart
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    min_score: u32,
    rate_limiter: RateLimiter,
}

impl MusicBrainzClient {
    pub fn with_config(config: MusicBrainzConfig) -> Result<Self, MetadataError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MetadataError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            min_score: config.min_score,
            rate_limiter: RateLimiter::new(config.min_interval),
        })
    }

    /// Wait for the next request slot
    pub async fn throttle(&self) {
        self.rate_limiter.wait().await;
    }

    /// Search for the release matching an artist and album title.
    ///
    /// Returns the raw release id of the best hit, or `None` when nothing
    /// scores high enough.
    pub async fn search_release(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, MetadataError> {
        let url = search_url(&self.base_url, artist, album);
        let Some(response) = self.get_json::<dto::ReleaseSearchResponse>(&url).await? else {
            return Ok(None);
        };

        let hits = response.releases.len();
        match adapter::best_release(response, self.min_score) {
            Some(found) => {
                tracing::debug!(
                    release = %found.id,
                    title = %found.title,
                    artist = ?found.artist,
                    score = found.score,
                    "MusicBrainz release match"
                );
                Ok(Some(found.id))
            }
            None => {
                tracing::debug!(hits, min_score = self.min_score, "No confident MusicBrainz match");
                Ok(None)
            }
        }
    }

    /// Look up a release and return its ordered track list.
    ///
    /// `None` when MusicBrainz doesn't know the release.
    pub async fn lookup_release(&self, release_id: &str) -> Result<Option<Vec<TrackInfo>>, MetadataError> {
        let url = format!(
            "{}/release/{}?inc=recordings&fmt=json",
            self.base_url,
            urlencoding::encode(release_id)
        );

        Ok(self
            .get_json::<dto::ReleaseResponse>(&url)
            .await?
            .map(adapter::to_track_list))
    }

    /// Send a GET and parse the JSON body.
    ///
    /// `Ok(None)` means HTTP 404.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, MetadataError> {
        tracing::debug!(url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        // MusicBrainz answers 503 when a client exceeds the rate limit
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(MetadataError::ProviderRateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(MetadataError::ProviderUnavailable(format!(
                    "HTTP {}: {}",
                    status, error.error
                )));
            }
            return Err(MetadataError::ProviderUnavailable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| MetadataError::ProviderUnavailable(format!("invalid response: {}", e)))
    }
}

/// Build the release search URL for an artist/album pair
fn search_url(base_url: &str, artist: &str, album: &str) -> String {
    let query = format!(
        "artist:\"{}\" AND release:\"{}\"",
        escape_phrase(artist),
        escape_phrase(album)
    );
    format!(
        "{}/release/?query={}&fmt=json&limit={}",
        base_url,
        urlencoding::encode(&query),
        SEARCH_LIMIT
    )
}

/// Escape a value for use inside a quoted Lucene phrase
fn escape_phrase(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MusicBrainzClient::with_config(MusicBrainzConfig::default()).unwrap();
        assert_eq!(client.base_url, "https://musicbrainz.org/ws/2");
        assert_eq!(client.min_score, 90);
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = MusicBrainzClient::with_config(MusicBrainzConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("RecordCatalog/"));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("https://mb.test/ws/2", "The Beatles", "Abbey Road");
        assert!(url.starts_with("https://mb.test/ws/2/release/?query="));
        assert!(url.contains("artist%3A%22The%20Beatles%22%20AND%20release%3A%22Abbey%20Road%22"));
        assert!(url.ends_with("&fmt=json&limit=5"));
    }

    #[test]
    fn test_escape_phrase() {
        assert_eq!(escape_phrase("  AC/DC "), "AC/DC");
        assert_eq!(escape_phrase(r#"12" Mix"#), r#"12\" Mix"#);
        assert_eq!(escape_phrase(r"back\slash"), r"back\\slash");
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
