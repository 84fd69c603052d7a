//! Cover Art Archive HTTP client
//!
//! Looks up the artwork listing of a release and picks the front cover.
//! No API key required, but please respect their rate limits.
//!
//! API: https://coverartarchive.org

use std::time::Duration;

use super::dto;
use crate::enrichment::domain::MetadataError;
use crate::enrichment::musicbrainz::USER_AGENT;

/// Production endpoint
pub const DEFAULT_BASE_URL: &str = "https://coverartarchive.org";

/// Cover Art Archive client
pub struct CoverArtClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoverArtClient {
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MetadataError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MetadataError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the front cover URL for a MusicBrainz release.
    ///
    /// Releases without artwork (HTTP 404) return `None`.
    pub async fn get_front_cover_url(&self, release_id: &str) -> Result<Option<String>, MetadataError> {
        Ok(self
            .list_cover_art(release_id)
            .await?
            .and_then(|listing| front_image_url(&listing)))
    }

    /// List all cover art for a release
    pub async fn list_cover_art(
        &self,
        release_id: &str,
    ) -> Result<Option<dto::CoverArtListing>, MetadataError> {
        let url = format!(
            "{}/release/{}",
            self.base_url,
            urlencoding::encode(release_id)
        );

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| MetadataError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(MetadataError::ProviderRateLimited);
        }

        if !status.is_success() {
            return Err(MetadataError::ProviderUnavailable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::CoverArtListing>()
            .await
            .map(Some)
            .map_err(|e| MetadataError::ProviderUnavailable(format!("invalid response: {}", e)))
    }
}

/// Choose the front cover from a listing.
///
/// Prefers an approved front image, then any image flagged front, then any
/// image typed "Front". Falls back to the 500px thumbnail when the full-size
/// URL is empty.
pub fn front_image_url(listing: &dto::CoverArtListing) -> Option<String> {
    let image = listing
        .images
        .iter()
        .find(|i| i.front && i.approved)
        .or_else(|| listing.images.iter().find(|i| i.front))
        .or_else(|| {
            listing
                .images
                .iter()
                .find(|i| i.types.iter().any(|t| t.eq_ignore_ascii_case("front")))
        })?;

    if !image.image.is_empty() {
        return Some(image.image.clone());
    }
    image
        .thumbnails
        .large
        .clone()
        .or_else(|| image.thumbnails.small.clone())
}
