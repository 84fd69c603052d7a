//! MusicBrainz API integration
//!
//! Resolves an artist/album pair to a release MBID and reads the track list
//! of a release.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use adapter::{ReleaseMatch, best_release, to_track_list};
pub use client::{DEFAULT_BASE_URL, MusicBrainzClient, MusicBrainzConfig, USER_AGENT};
