//! Metadata resolution service - cache-aside lookups over a slow provider
//!
//! Every operation follows the same shape:
//! 1. Check the snapshot cache
//! 2. On a miss, take the per-key lock and check again in case someone beat us
//! 3. Wait for the provider's rate limiter, then ask it (bounded by a timeout)
//! 4. Write a fresh snapshot and return
//!
//! Negative results ("no match", "no such release") are never cached.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::domain::{MetadataError, MetadataSnapshot, SearchResponse, TrackInfo};
use super::inflight::InFlight;
use super::mbid::Mbid;
use super::traits::MetadataProvider;
use crate::cache::SnapshotStore;

/// Tuning for the resolution service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Lifetime of every cached snapshot
    pub ttl: Duration,
    /// Upper bound on a single provider call
    pub provider_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(7 * 24 * 60 * 60),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

/// Resolves artist/album pairs to MBIDs and serves release metadata
pub struct MetadataService {
    store: Arc<dyn SnapshotStore>,
    provider: Arc<dyn MetadataProvider>,
    config: ServiceConfig,
    inflight: InFlight,
}

impl MetadataService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        provider: Arc<dyn MetadataProvider>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            inflight: InFlight::new(),
        }
    }

    /// Resolve an artist/album pair to a release MBID.
    ///
    /// Returns `Ok(None)` when the provider has no confident match, or when
    /// it answers with something that is not an MBID.
    pub async fn resolve_mbid(&self, artist: &str, album: &str) -> Result<Option<Mbid>, MetadataError> {
        let artist = artist.trim();
        let album = album.trim();
        if artist.is_empty() || album.is_empty() {
            return Ok(None);
        }

        if let Some(snapshot) = self.store.get_by_artist_album(artist, album).await? {
            tracing::debug!(artist, album, mbid = %snapshot.mbid, "Release cache hit");
            return Ok(Some(snapshot.mbid));
        }

        // The previous holder of the key may have filled the cache meanwhile
        let flight = self.inflight.acquire(release_key(artist, album)).await;
        if let Some(snapshot) = self.store.get_by_artist_album(artist, album).await? {
            tracing::debug!(artist, album, waited = flight.waited(), "Release filled by concurrent lookup");
            return Ok(Some(snapshot.mbid));
        }

        tracing::debug!(artist, album, "Release cache miss, searching provider");
        self.provider.throttle().await;
        let raw = self
            .bounded("release search", self.provider.search_release_mbid(artist, album))
            .await?;

        let Some(raw) = raw else {
            tracing::debug!(artist, album, "No release found");
            return Ok(None);
        };

        let mbid = match Mbid::parse(&raw) {
            Ok(mbid) => mbid,
            Err(_) => {
                tracing::warn!(artist, album, raw = %raw, "Provider returned a malformed MBID, ignoring");
                return Ok(None);
            }
        };

        let (tracks, cover) = self.fetch_release(&mbid).await;
        let Some(tracks) = tracks? else {
            tracing::warn!(artist, album, mbid = %mbid, "Search matched a release the provider cannot look up, not caching");
            return Ok(Some(mbid));
        };
        let snapshot = self
            .snapshot(&mbid, tracks, lenient_cover(&mbid, cover))
            .with_release(artist, album);
        self.persist(snapshot).await?;

        Ok(Some(mbid))
    }

    /// [`resolve_mbid`](Self::resolve_mbid) shaped for a JSON response.
    pub async fn search(&self, artist: &str, album: &str) -> Result<SearchResponse, MetadataError> {
        self.resolve_mbid(artist, album).await.map(SearchResponse::from)
    }

    /// Ordered track list for a release.
    ///
    /// An empty list from a known release is cached like any other answer.
    /// A release the provider doesn't know also comes back empty, but is not
    /// cached.
    pub async fn get_track_list(&self, mbid: &Mbid) -> Result<Vec<TrackInfo>, MetadataError> {
        if let Some(snapshot) = self.cached(mbid).await? {
            return Ok(snapshot.track_list);
        }

        let flight = self.inflight.acquire(mbid_key(mbid)).await;
        if let Some(snapshot) = self.recheck(mbid, flight.waited()).await? {
            return Ok(snapshot.track_list);
        }

        let (tracks, cover) = self.fetch_release(mbid).await;
        let Some(tracks) = tracks? else {
            tracing::debug!(mbid = %mbid, "Release unknown to provider");
            return Ok(Vec::new());
        };
        let snapshot = self.snapshot(mbid, tracks, lenient_cover(mbid, cover));
        let tracks = snapshot.track_list.clone();
        self.persist(snapshot).await?;

        Ok(tracks)
    }

    /// Front cover reference for a release, if it has one.
    ///
    /// Unlike the other lookups a cover failure is the whole answer here, so it
    /// propagates and nothing is cached.
    pub async fn get_cover_image(&self, mbid: &Mbid) -> Result<Option<String>, MetadataError> {
        if let Some(snapshot) = self.cached(mbid).await? {
            return Ok(snapshot.cover_image);
        }

        let flight = self.inflight.acquire(mbid_key(mbid)).await;
        if let Some(snapshot) = self.recheck(mbid, flight.waited()).await? {
            return Ok(snapshot.cover_image);
        }

        let (tracks, cover) = self.fetch_release(mbid).await;
        let cover = cover?;
        let Some(tracks) = tracks? else {
            tracing::debug!(mbid = %mbid, "Release unknown to provider");
            return Ok(None);
        };
        self.persist(self.snapshot(mbid, tracks, cover.clone())).await?;

        Ok(cover)
    }

    async fn cached(&self, mbid: &Mbid) -> Result<Option<MetadataSnapshot>, MetadataError> {
        let hit = self.store.get_by_mbid(mbid).await?;
        match &hit {
            Some(_) => tracing::debug!(mbid = %mbid, "Snapshot cache hit"),
            None => tracing::debug!(mbid = %mbid, "Snapshot cache miss"),
        }
        Ok(hit)
    }

    /// Second look after taking the key's lock.
    async fn recheck(&self, mbid: &Mbid, waited: bool) -> Result<Option<MetadataSnapshot>, MetadataError> {
        let hit = self.store.get_by_mbid(mbid).await?;
        if hit.is_some() {
            tracing::debug!(mbid = %mbid, waited, "Snapshot filled by concurrent lookup");
        }
        Ok(hit)
    }

    /// Fetch tracks and cover concurrently; they hit different services.
    async fn fetch_release(
        &self,
        mbid: &Mbid,
    ) -> (
        Result<Option<Vec<TrackInfo>>, MetadataError>,
        Result<Option<String>, MetadataError>,
    ) {
        self.provider.throttle().await;
        tokio::join!(
            self.bounded("track list", self.provider.fetch_track_list(mbid)),
            self.bounded("cover image", self.provider.fetch_cover_image(mbid)),
        )
    }

    fn snapshot(&self, mbid: &Mbid, tracks: Vec<TrackInfo>, cover: Option<String>) -> MetadataSnapshot {
        MetadataSnapshot::new(mbid.clone(), tracks, Utc::now(), self.config.ttl).with_cover_image(cover)
    }

    /// Run a provider call under the configured timeout.
    ///
    /// Throttling happens before this, so the deadline covers only the call.
    async fn bounded<T>(
        &self,
        what: &str,
        call: impl Future<Output = Result<T, MetadataError>>,
    ) -> Result<T, MetadataError> {
        let limit = self.config.provider_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(MetadataError::ProviderUnavailable(format!(
                "{} timed out after {:?}",
                what, limit
            ))),
        }
    }

    /// Write a snapshot on a detached task so it lands even if our caller
    /// goes away mid-write.
    async fn persist(&self, snapshot: MetadataSnapshot) -> Result<(), MetadataError> {
        let store = Arc::clone(&self.store);
        let mbid = snapshot.mbid.clone();
        let write = tokio::spawn(async move { store.upsert(&snapshot).await });

        write
            .await
            .map_err(|e| MetadataError::StorageUnavailable(format!("cache write aborted: {}", e)))??;

        tracing::info!(mbid = %mbid, "Cached release snapshot");
        Ok(())
    }
}

fn lenient_cover(mbid: &Mbid, cover: Result<Option<String>, MetadataError>) -> Option<String> {
    cover.unwrap_or_else(|e| {
        tracing::warn!(mbid = %mbid, "Cover art lookup failed, caching without it: {}", e);
        None
    })
}

fn release_key(artist: &str, album: &str) -> String {
    format!("release\u{1f}{}\u{1f}{}", artist, album)
}

fn mbid_key(mbid: &Mbid) -> String {
    format!("mbid\u{1f}{}", mbid)
}
