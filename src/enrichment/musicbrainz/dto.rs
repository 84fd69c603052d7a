//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to domain types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! We use two endpoints:
//! - `/release/?query=...` to search a release by artist and title
//! - `/release/{mbid}?inc=recordings` to read the track list of a release

use serde::{Deserialize, Serialize};

/// Release search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseSearchResponse {
    /// Total number of hits on the server
    #[serde(default)]
    pub count: u32,
    /// Offset of this page
    #[serde(default)]
    pub offset: u32,
    /// Matching releases, best first
    #[serde(default)]
    pub releases: Vec<ReleaseHit>,
}

/// One search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseHit {
    /// MusicBrainz release ID
    pub id: String,
    /// Search relevance (0-100)
    #[serde(default)]
    pub score: u32,
    /// Release title
    pub title: String,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// The artist
    pub artist: Artist,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
}

/// Release lookup response (single release with recordings)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseResponse {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Media (discs, sides) in this release
    #[serde(default)]
    pub media: Vec<Medium>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    /// Position in release (disc number)
    pub position: Option<u32>,
    /// Format (CD, Vinyl, Digital, etc.)
    pub format: Option<String>,
    /// Number of tracks
    pub track_count: Option<u32>,
    /// Tracks on this medium
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    /// Track position on medium
    pub position: Option<u32>,
    /// Track number (may include side prefix like "A1")
    pub number: Option<String>,
    /// Track title (may differ from recording title)
    pub title: Option<String>,
    /// Track length in milliseconds
    pub length: Option<u64>,
    /// The recording this track plays
    pub recording: Option<Recording>,
}

/// Recording referenced by a track
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    /// Recording title
    pub title: String,
    /// Duration in milliseconds
    pub length: Option<u64>,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_release_search() {
        let json = r#"{
            "created": "2024-01-01T00:00:00.000Z",
            "count": 2,
            "offset": 0,
            "releases": [{
                "id": "b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d",
                "score": 100,
                "title": "Abbey Road",
                "status": "Official",
                "date": "1969-09-26",
                "artist-credit": [{
                    "name": "The Beatles",
                    "artist": {
                        "id": "b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d",
                        "name": "The Beatles",
                        "sort-name": "Beatles, The"
                    }
                }]
            }, {
                "id": "11111111-1111-1111-1111-111111111111",
                "score": 62,
                "title": "Abbey Road Revisited"
            }]
        }"#;

        let response: ReleaseSearchResponse =
            serde_json::from_str(json).expect("Should parse release search");

        assert_eq!(response.count, 2);
        assert_eq!(response.releases.len(), 2);
        assert_eq!(response.releases[0].score, 100);
        assert_eq!(response.releases[0].artist_credit[0].artist.name, "The Beatles");
        assert!(response.releases[1].artist_credit.is_empty());
        assert!(response.releases[1].status.is_none());
    }

    #[test]
    fn test_parse_empty_search() {
        let json = r#"{"count": 0, "offset": 0, "releases": []}"#;
        let response: ReleaseSearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.releases.is_empty());
    }

    #[test]
    fn test_parse_release_with_recordings() {
        let json = r#"{
            "id": "b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d",
            "title": "Abbey Road",
            "status": "Official",
            "media": [{
                "position": 1,
                "format": "12\" Vinyl",
                "track-count": 2,
                "tracks": [{
                    "id": "t1",
                    "position": 1,
                    "number": "A1",
                    "title": "Come Together",
                    "length": 259946,
                    "recording": {
                        "id": "rec-1",
                        "title": "Come Together",
                        "length": 259946
                    }
                }, {
                    "id": "t2",
                    "position": 2,
                    "number": "A2",
                    "title": "Something",
                    "length": null
                }]
            }]
        }"#;

        let release: ReleaseResponse =
            serde_json::from_str(json).expect("Should parse release lookup");

        assert_eq!(release.title, "Abbey Road");
        let medium = &release.media[0];
        assert_eq!(medium.track_count, Some(2));
        assert_eq!(medium.format.as_deref(), Some("12\" Vinyl"));
        assert_eq!(medium.tracks[0].number.as_deref(), Some("A1"));
        assert_eq!(
            medium.tracks[0].recording.as_ref().map(|r| r.id.as_str()),
            Some("rec-1")
        );
        assert!(medium.tracks[1].length.is_none());
        assert!(medium.tracks[1].recording.is_none());
    }

    #[test]
    fn test_parse_release_without_media() {
        let json = r#"{"id": "x", "title": "Nothing Here"}"#;
        let release: ReleaseResponse = serde_json::from_str(json).unwrap();
        assert!(release.media.is_empty());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": "Not Found",
            "help": "For usage, please see: https://musicbrainz.org/doc/MusicBrainz_API"
        }"#;

        let error: ApiError = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(error.error, "Not Found");
        assert!(error.help.is_some());
    }
}
