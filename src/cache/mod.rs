//! Release metadata cache.
//!
//! The cache owns every [`MetadataSnapshot`]; the resolution service only goes
//! through [`SnapshotStore`].
//!
//! # Expiry
//!
//! Every snapshot carries an `expires_at`. Reads never return a snapshot past
//! that point, whether or not it has been physically deleted yet. Deletion is
//! the job of [`CacheSweeper`], which purges on its own schedule.

mod sqlite;
mod sweeper;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::enrichment::{Mbid, MetadataError, MetadataSnapshot};

pub use sqlite::SqliteSnapshotStore;
pub use sweeper::{CacheSweeper, SweeperCommand, SweeperConfig, SweeperEvent};

/// Persistent store of release snapshots keyed by MBID.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Exact lookup by MBID. Expired snapshots are never returned.
    async fn get_by_mbid(&self, mbid: &Mbid) -> Result<Option<MetadataSnapshot>, MetadataError>;

    /// Lookup by the artist/album pair a snapshot was resolved from.
    ///
    /// Matching is exact. When several unexpired snapshots match, the most
    /// recently fetched one wins.
    async fn get_by_artist_album(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<MetadataSnapshot>, MetadataError>;

    /// Insert or replace the snapshot for `snapshot.mbid`.
    async fn upsert(&self, snapshot: &MetadataSnapshot) -> Result<(), MetadataError>;

    /// Delete every snapshot expired at `now`, returning how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, MetadataError>;

    /// Number of live (unexpired) snapshots.
    async fn count(&self) -> Result<u64, MetadataError>;
}
