//! Cover Art Archive listing, reduced to what front cover selection reads.
//!
//! API Reference: https://wiki.musicbrainz.org/Cover_Art_Archive/API

use serde::Deserialize;

/// `GET /release/{mbid}` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverArtListing {
    #[serde(default)]
    pub images: Vec<ListedImage>,
}

/// One artwork entry of a listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedImage {
    #[serde(default)]
    pub front: bool,
    #[serde(default)]
    pub approved: bool,
    /// "Front", "Back", "Booklet", ...
    #[serde(default)]
    pub types: Vec<String>,
    /// Full-size URL. Occasionally empty while the archive is still processing an upload.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub thumbnails: ImageThumbnails,
}

/// Fallback sizes used when the full-size URL is missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageThumbnails {
    #[serde(rename = "500")]
    pub large: Option<String>,
    #[serde(rename = "250")]
    pub small: Option<String>,
}
