//! Trait definitions for the external metadata provider.
//!
//! The resolution service only ever talks to a [`MetadataProvider`], so tests
//! can substitute a mock and production code can wire in the MusicBrainz
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use record_catalog::enrichment::{MetadataError, MetadataProvider};
//!
//! async fn lookup<P: MetadataProvider>(provider: &P) -> Result<Option<String>, MetadataError> {
//!     provider.throttle().await;
//!     provider.search_release_mbid("The Beatles", "Abbey Road").await
//! }
//! ```

use async_trait::async_trait;

use super::domain::{MetadataError, TrackInfo};
use super::mbid::Mbid;

/// External source of release identifiers, track lists and cover art.
///
/// Implementations perform no retries and no caching. Failures are reported as
/// [`MetadataError::ProviderUnavailable`] or [`MetadataError::ProviderRateLimited`].
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Best-effort match of an artist/album pair to a release.
    ///
    /// Returns the raw identifier string exactly as the provider reported it;
    /// callers must validate it. `None` means no confident match.
    async fn search_release_mbid(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, MetadataError>;

    /// Ordered track list of a release.
    ///
    /// `Some(vec![])` is a known release without tracks; `None` means the
    /// provider has never heard of the release.
    async fn fetch_track_list(&self, mbid: &Mbid) -> Result<Option<Vec<TrackInfo>>, MetadataError>;

    /// Front cover reference (URL) of a release, if it has one.
    async fn fetch_cover_image(&self, mbid: &Mbid) -> Result<Option<String>, MetadataError>;

    /// Wait until the provider's request budget allows another call.
    ///
    /// Callers await this before each call they put a deadline on, so time
    /// spent queued locally is not mistaken for a slow provider.
    async fn throttle(&self) {}
}
