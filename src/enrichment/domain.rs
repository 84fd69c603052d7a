//! Internal domain models for release metadata.
//!
//! These types are OUR types - they don't change when external APIs change.
//! Provider responses get converted into these types via adapters, and the
//! cache persists them as-is.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mbid::Mbid;

/// One entry of a release's track list.
///
/// The cache passes these through untouched; only the provider adapter builds them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Track title
    pub title: String,
    /// Position across the whole release (1-based)
    pub position: u32,
    /// Printed track number (may be "A1", "1-5", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Disc / side the track sits on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<u32>,
    /// Track length in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_ms: Option<u64>,
    /// MusicBrainz recording ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_id: Option<String>,
}

/// Cached metadata for one release.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSnapshot {
    pub mbid: Mbid,
    pub track_list: Vec<TrackInfo>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover_image: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MetadataSnapshot {
    /// Build a snapshot fetched at `fetched_at` that lives for `ttl`.
    ///
    /// Timestamps are kept at millisecond precision, the resolution the cache stores.
    /// A TTL below one millisecond is bumped up so `expires_at > fetched_at` always holds.
    pub fn new(mbid: Mbid, track_list: Vec<TrackInfo>, fetched_at: DateTime<Utc>, ttl: Duration) -> Self {
        let fetched_at =
            DateTime::from_timestamp_millis(fetched_at.timestamp_millis()).unwrap_or(fetched_at);
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1);
        let expires_at = chrono::Duration::try_milliseconds(ttl_ms)
            .and_then(|ttl| fetched_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            mbid,
            track_list,
            artist: None,
            album: None,
            cover_image: None,
            fetched_at,
            expires_at,
        }
    }

    /// Record the artist/album pair this release was resolved from.
    pub fn with_release(mut self, artist: impl Into<String>, album: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self.album = Some(album.into());
        self
    }

    pub fn with_cover_image(mut self, cover_image: Option<String>) -> Self {
        self.cover_image = cover_image;
        self
    }

    /// Whether this snapshot is past its expiry at `now`.
    #[cfg(test)]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Response shape handed to the JSON layer for an artist/album search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub mbid: Option<String>,
}

impl From<Option<Mbid>> for SearchResponse {
    fn from(mbid: Option<Mbid>) -> Self {
        Self {
            mbid: mbid.map(|m| m.to_string()),
        }
    }
}

/// Errors raised while resolving release metadata
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
    #[error("Invalid MBID format: {0:?}")]
    InvalidFormat(String),

    #[error("Metadata cache unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Metadata provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Metadata provider rate limited - try again later")]
    ProviderRateLimited,
}

impl MetadataError {
    /// Failures worth retrying later (at a higher level).
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidFormat(_))
    }

    /// Failures caused by bad input rather than by infrastructure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }
}

impl From<sqlx::Error> for MetadataError {
    fn from(e: sqlx::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for MetadataError {
    fn from(e: serde_json::Error) -> Self {
        Self::StorageUnavailable(format!("corrupt cache entry: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mbid() -> Mbid {
        Mbid::parse("b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d").unwrap()
    }

    #[test]
    fn test_snapshot_expiry_after_fetch() {
        let now = Utc::now();
        let snap = MetadataSnapshot::new(mbid(), vec![], now, Duration::from_secs(60));
        assert_eq!(snap.expires_at - snap.fetched_at, chrono::Duration::seconds(60));
        assert!(!snap.is_expired_at(now));
        assert!(snap.is_expired_at(now + chrono::Duration::seconds(60)));
    }

    #[test]
    fn test_zero_ttl_still_expires_later() {
        let now = Utc::now();
        let snap = MetadataSnapshot::new(mbid(), vec![], now, Duration::ZERO);
        assert!(snap.expires_at > snap.fetched_at);
    }

    #[test]
    fn test_snapshot_builders() {
        let snap = MetadataSnapshot::new(mbid(), vec![], Utc::now(), Duration::from_secs(1))
            .with_release("The Beatles", "Abbey Road")
            .with_cover_image(Some("https://example.com/front.jpg".to_string()));
        assert_eq!(snap.artist.as_deref(), Some("The Beatles"));
        assert_eq!(snap.album.as_deref(), Some("Abbey Road"));
        assert_eq!(snap.cover_image.as_deref(), Some("https://example.com/front.jpg"));
    }

    #[test]
    fn test_search_response_json() {
        let found = SearchResponse::from(Some(mbid()));
        assert_eq!(
            serde_json::to_string(&found).unwrap(),
            r#"{"mbid":"b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d"}"#
        );

        let missing = SearchResponse::from(None);
        assert_eq!(serde_json::to_string(&missing).unwrap(), r#"{"mbid":null}"#);
    }

    #[test]
    fn test_track_info_skips_empty_fields() {
        let track = TrackInfo {
            title: "Come Together".to_string(),
            position: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&track).unwrap();
        assert_eq!(json, r#"{"title":"Come Together","position":1}"#);
    }

    #[test]
    fn test_error_classification() {
        assert!(MetadataError::InvalidFormat("x".into()).is_client_error());
        assert!(!MetadataError::InvalidFormat("x".into()).is_transient());
        assert!(MetadataError::ProviderRateLimited.is_transient());
        assert!(MetadataError::StorageUnavailable("disk".into()).is_transient());
    }
}
