//! MusicBrainz-backed metadata provider.
//!
//! Glues the MusicBrainz client (search + track lists) and the Cover Art
//! Archive client (front covers) together behind [`MetadataProvider`].

use async_trait::async_trait;

use super::coverart::CoverArtClient;
use super::domain::{MetadataError, TrackInfo};
use super::mbid::Mbid;
use super::musicbrainz::{MusicBrainzClient, MusicBrainzConfig};
use super::traits::MetadataProvider;

/// Provider backed by MusicBrainz and the Cover Art Archive
pub struct MusicBrainzProvider {
    musicbrainz: MusicBrainzClient,
    coverart: CoverArtClient,
}

impl MusicBrainzProvider {
    pub fn new(musicbrainz: MusicBrainzClient, coverart: CoverArtClient) -> Self {
        Self {
            musicbrainz,
            coverart,
        }
    }

    /// Build both clients from settings.
    pub fn from_config(
        config: MusicBrainzConfig,
        coverart_url: &str,
    ) -> Result<Self, MetadataError> {
        let coverart = CoverArtClient::with_base_url(coverart_url, config.timeout)?;
        let musicbrainz = MusicBrainzClient::with_config(config)?;
        Ok(Self::new(musicbrainz, coverart))
    }
}

#[async_trait]
impl MetadataProvider for MusicBrainzProvider {
    async fn search_release_mbid(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, MetadataError> {
        self.musicbrainz.search_release(artist, album).await
    }

    async fn fetch_track_list(&self, mbid: &Mbid) -> Result<Option<Vec<TrackInfo>>, MetadataError> {
        self.musicbrainz.lookup_release(mbid.as_str()).await
    }

    async fn fetch_cover_image(&self, mbid: &Mbid) -> Result<Option<String>, MetadataError> {
        self.coverart.get_front_cover_url(mbid.as_str()).await
    }

    /// Only MusicBrainz is rate limited; the Cover Art Archive is not.
    async fn throttle(&self) {
        self.musicbrainz.throttle().await
    }
}
