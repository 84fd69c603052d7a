//! SQLite implementation of [`SnapshotStore`].
//!
//! Provides CRUD operations and queries for the `mbid_cache` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use super::SnapshotStore;
use crate::enrichment::{Mbid, MetadataError, MetadataSnapshot, TrackInfo};

// ============================================================================
// Database Row Types
// ============================================================================

/// Database row for mbid_cache table.
#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    mbid: String,
    track_list: String,
    artist: Option<String>,
    album: Option<String>,
    cover_image: Option<String>,
    fetched_at: i64,
    expires_at: i64,
}

impl TryFrom<SnapshotRow> for MetadataSnapshot {
    type Error = MetadataError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let mbid = Mbid::parse(&row.mbid).map_err(|_| {
            MetadataError::StorageUnavailable(format!("corrupt cache entry: mbid {:?}", row.mbid))
        })?;
        let track_list: Vec<TrackInfo> = serde_json::from_str(&row.track_list)?;

        Ok(MetadataSnapshot {
            mbid,
            track_list,
            artist: row.artist,
            album: row.album,
            cover_image: row.cover_image,
            fetched_at: from_millis(row.fetched_at)?,
            expires_at: from_millis(row.expires_at)?,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, MetadataError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        MetadataError::StorageUnavailable(format!("corrupt cache entry: timestamp {}", ms))
    })
}

const SELECT_COLUMNS: &str =
    "SELECT mbid, track_list, artist, album, cover_image, fetched_at, expires_at FROM mbid_cache";

// ============================================================================
// Store
// ============================================================================

/// Snapshot store backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    /// Wrap a pool whose migrations have already run (see [`crate::db::init_db`]).
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Rows already expired at `now` but not yet purged.
    pub async fn count_expired(&self, now: DateTime<Utc>) -> Result<u64, MetadataError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM mbid_cache WHERE expires_at <= ?")
                .bind(now.timestamp_millis())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn get_by_mbid(&self, mbid: &Mbid) -> Result<Option<MetadataSnapshot>, MetadataError> {
        let row: Option<SnapshotRow> =
            sqlx::query_as(&format!("{} WHERE mbid = ? AND expires_at > ?", SELECT_COLUMNS))
                .bind(mbid.as_str())
                .bind(Utc::now().timestamp_millis())
                .fetch_optional(&self.pool)
                .await?;

        row.map(MetadataSnapshot::try_from).transpose()
    }

    async fn get_by_artist_album(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<MetadataSnapshot>, MetadataError> {
        let row: Option<SnapshotRow> = sqlx::query_as(&format!(
            "{} WHERE artist = ? AND album = ? AND expires_at > ? ORDER BY fetched_at DESC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(artist)
        .bind(album)
        .bind(Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MetadataSnapshot::try_from).transpose()
    }

    /// Uses SQLite's UPSERT so concurrent writers for the same MBID end with
    /// whichever write landed last.
    async fn upsert(&self, snapshot: &MetadataSnapshot) -> Result<(), MetadataError> {
        if snapshot.expires_at <= snapshot.fetched_at {
            return Err(MetadataError::StorageUnavailable(format!(
                "snapshot for {} expires before it was fetched",
                snapshot.mbid
            )));
        }

        let track_list = serde_json::to_string(&snapshot.track_list)?;

        sqlx::query(
            r#"
            INSERT INTO mbid_cache (
                mbid, track_list, artist, album, cover_image, fetched_at, expires_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(mbid) DO UPDATE SET
                track_list = excluded.track_list,
                artist = excluded.artist,
                album = excluded.album,
                cover_image = excluded.cover_image,
                fetched_at = excluded.fetched_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(snapshot.mbid.as_str())
        .bind(&track_list)
        .bind(&snapshot.artist)
        .bind(&snapshot.album)
        .bind(&snapshot.cover_image)
        .bind(snapshot.fetched_at.timestamp_millis())
        .bind(snapshot.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, MetadataError> {
        let result = sqlx::query("DELETE FROM mbid_cache WHERE expires_at <= ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, MetadataError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM mbid_cache WHERE expires_at > ?")
                .bind(Utc::now().timestamp_millis())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u64)
    }
}
