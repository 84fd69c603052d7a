//! Test utilities and fixtures for record-catalog tests.
//!
//! This module provides common test helpers, mock factories, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{temp_store, mock_snapshot, TEST_MBID};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (store, _dir) = temp_store().await;
//!     store.upsert(&mock_snapshot(TEST_MBID)).await.unwrap();
//! }
//! ```

use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;

use crate::cache::SqliteSnapshotStore;
use crate::enrichment::{Mbid, MetadataSnapshot, TrackInfo};

/// Abbey Road (1969 UK LP), already normalized.
pub const TEST_MBID: &str = "b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d";

/// A second, unrelated release.
pub const OTHER_MBID: &str = "f4a31f0a-51dd-4fa7-986d-3095c40c5ed9";

/// Creates a snapshot store backed by a temporary database.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically. Keep the TempDir alive for the duration of your test.
pub async fn temp_store() -> (SqliteSnapshotStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (SqliteSnapshotStore::new(pool), dir)
}

/// First few tracks of Abbey Road.
pub fn mock_tracks() -> Vec<TrackInfo> {
    [
        ("Come Together", 259_973),
        ("Something", 182_293),
        ("Maxwell's Silver Hammer", 207_186),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (title, length_ms))| TrackInfo {
        title: title.to_string(),
        position: i as u32 + 1,
        number: Some((i + 1).to_string()),
        medium: Some(1),
        length_ms: Some(length_ms),
        recording_id: None,
    })
    .collect()
}

/// Creates a fresh snapshot for `mbid` with [`mock_tracks`] and a one hour TTL.
///
/// Customize with the snapshot builders:
///
/// ```ignore
/// let snapshot = mock_snapshot(TEST_MBID).with_release("Artist", "Album");
/// ```
pub fn mock_snapshot(mbid: &str) -> MetadataSnapshot {
    MetadataSnapshot::new(
        Mbid::parse(mbid).expect("mock MBID must be valid"),
        mock_tracks(),
        Utc::now(),
        Duration::from_secs(3600),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SnapshotStore;

    #[tokio::test]
    async fn test_temp_store_starts_empty() {
        let (store, _dir) = temp_store().await;
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_mock_snapshot_is_fresh() {
        let snapshot = mock_snapshot(TEST_MBID);
        assert!(!snapshot.is_expired_at(Utc::now()));
        assert_eq!(snapshot.track_list.len(), 3);
        assert_eq!(snapshot.track_list[0].position, 1);
    }
}
