//! Cover Art Archive integration
//!
//! Finds the front cover of a MusicBrainz release on coverartarchive.org.
//! No API key required.

pub mod dto;
mod client;

pub use client::{CoverArtClient, DEFAULT_BASE_URL, front_image_url};
