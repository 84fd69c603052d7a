//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::enrichment::domain::TrackInfo;

/// A search hit that cleared the score threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMatch {
    /// Release id exactly as the API returned it (unvalidated)
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub score: u32,
}

/// Pick the best search hit scoring at least `min_score`.
///
/// Ties keep the server's order, which favours official releases.
pub fn best_release(response: dto::ReleaseSearchResponse, min_score: u32) -> Option<ReleaseMatch> {
    let mut best: Option<dto::ReleaseHit> = None;
    for hit in response.releases {
        if hit.score < min_score {
            continue;
        }
        if best.as_ref().is_none_or(|b| hit.score > b.score) {
            best = Some(hit);
        }
    }

    best.map(|hit| ReleaseMatch {
        artist: artist_string(&hit.artist_credit),
        id: hit.id,
        title: hit.title,
        score: hit.score,
    })
}

/// Flatten all media of a release into one ordered track list.
///
/// Media are ordered by their position, tracks by their position within the
/// medium; `position` on the result counts across the whole release.
pub fn to_track_list(release: dto::ReleaseResponse) -> Vec<TrackInfo> {
    let mut media = release.media;
    media.sort_by_key(|m| m.position.unwrap_or(u32::MAX));

    let mut tracks = Vec::new();
    for medium in media {
        let mut medium_tracks = medium.tracks;
        medium_tracks.sort_by_key(|t| t.position.unwrap_or(u32::MAX));

        for track in medium_tracks {
            let position = tracks.len() as u32 + 1;
            tracks.push(to_track_info(track, medium.position, position));
        }
    }
    tracks
}

fn to_track_info(track: dto::Track, medium: Option<u32>, position: u32) -> TrackInfo {
    // Track title wins over recording title (tracks can be credited differently)
    let title = track
        .title
        .or_else(|| track.recording.as_ref().map(|r| r.title.clone()))
        .unwrap_or_default();

    let length_ms = track
        .length
        .or_else(|| track.recording.as_ref().and_then(|r| r.length));

    TrackInfo {
        title,
        position,
        number: track.number,
        medium,
        length_ms,
        recording_id: track.recording.map(|r| r.id),
    }
}

/// Build a combined artist string from artist credits
pub fn artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        // Add join phrase if present (e.g., " & ", " feat. ")
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: u32) -> dto::ReleaseHit {
        dto::ReleaseHit {
            id: id.to_string(),
            score,
            title: "Album".to_string(),
            status: None,
            date: None,
            artist_credit: vec![],
        }
    }

    fn track(position: u32, title: &str) -> dto::Track {
        dto::Track {
            position: Some(position),
            number: Some(position.to_string()),
            title: Some(title.to_string()),
            length: Some(1000),
            recording: None,
        }
    }

    fn medium(position: u32, tracks: Vec<dto::Track>) -> dto::Medium {
        dto::Medium {
            position: Some(position),
            format: Some("CD".to_string()),
            track_count: Some(tracks.len() as u32),
            tracks,
        }
    }

    #[test]
    fn test_best_release_prefers_highest_score() {
        let response = dto::ReleaseSearchResponse {
            count: 3,
            offset: 0,
            releases: vec![hit("a", 95), hit("b", 100), hit("c", 100)],
        };
        let best = best_release(response, 90).unwrap();
        assert_eq!(best.id, "b");
        assert_eq!(best.score, 100);
    }

    #[test]
    fn test_best_release_below_threshold() {
        let response = dto::ReleaseSearchResponse {
            count: 1,
            offset: 0,
            releases: vec![hit("a", 70)],
        };
        assert!(best_release(response, 90).is_none());
    }

    #[test]
    fn test_best_release_empty() {
        let response = dto::ReleaseSearchResponse {
            count: 0,
            offset: 0,
            releases: vec![],
        };
        assert!(best_release(response, 0).is_none());
    }

    #[test]
    fn test_track_list_orders_media_and_tracks() {
        let release = dto::ReleaseResponse {
            id: "r".to_string(),
            title: "Double".to_string(),
            media: vec![
                medium(2, vec![track(2, "D2T2"), track(1, "D2T1")]),
                medium(1, vec![track(1, "D1T1")]),
            ],
        };

        let tracks = to_track_list(release);
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["D1T1", "D2T1", "D2T2"]);
        assert_eq!(tracks[2].position, 3);
        assert_eq!(tracks[2].medium, Some(2));
    }

    #[test]
    fn test_track_falls_back_to_recording() {
        let release = dto::ReleaseResponse {
            id: "r".to_string(),
            title: "Single".to_string(),
            media: vec![medium(
                1,
                vec![dto::Track {
                    position: Some(1),
                    number: None,
                    title: None,
                    length: None,
                    recording: Some(dto::Recording {
                        id: "rec-1".to_string(),
                        title: "From Recording".to_string(),
                        length: Some(4200),
                    }),
                }],
            )],
        };

        let tracks = to_track_list(release);
        assert_eq!(tracks[0].title, "From Recording");
        assert_eq!(tracks[0].length_ms, Some(4200));
        assert_eq!(tracks[0].recording_id.as_deref(), Some("rec-1"));
    }

    #[test]
    fn test_empty_release_has_no_tracks() {
        let release = dto::ReleaseResponse {
            id: "r".to_string(),
            title: "Empty".to_string(),
            media: vec![],
        };
        assert!(to_track_list(release).is_empty());
    }

    #[test]
    fn test_artist_string_joins_credits() {
        let credits = vec![
            dto::ArtistCredit {
                name: None,
                artist: dto::Artist {
                    id: "1".to_string(),
                    name: "Queen".to_string(),
                    sort_name: None,
                },
                joinphrase: Some(" & ".to_string()),
            },
            dto::ArtistCredit {
                name: Some("Bowie".to_string()),
                artist: dto::Artist {
                    id: "2".to_string(),
                    name: "David Bowie".to_string(),
                    sort_name: None,
                },
                joinphrase: None,
            },
        ];
        assert_eq!(artist_string(&credits).as_deref(), Some("Queen & Bowie"));
        assert!(artist_string(&[]).is_none());
    }
}
