//! Release lookup commands.

use serde_json::json;
use tokio::runtime::Runtime;

use super::{OutputFormat, build_service, open_store};
use crate::config::Config;
use crate::enrichment::{Mbid, SearchResponse, TrackInfo};
use crate::error::ResultExt;

/// Resolve an artist/album pair to a release MBID
pub fn cmd_resolve(
    rt: &Runtime,
    settings: &Config,
    artist: &str,
    album: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(settings).await?;
        let service = build_service(settings, store)?;

        let response = service
            .search(artist, album)
            .await
            .with_context(format!("resolving {:?} / {:?}", artist, album))?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
            OutputFormat::Text => print!("{}", render_resolution(artist, album, &response)),
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Show the track list of a release
pub fn cmd_tracks(
    rt: &Runtime,
    settings: &Config,
    mbid: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mbid: Mbid = mbid.parse()?;

    rt.block_on(async {
        let store = open_store(settings).await?;
        let service = build_service(settings, store)?;

        let tracks = service
            .get_track_list(&mbid)
            .await
            .with_context(format!("fetching tracks for {}", mbid))?;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tracks)?),
            OutputFormat::Text => print!("{}", render_tracks(&mbid, &tracks)),
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Show the front cover of a release
pub fn cmd_cover(
    rt: &Runtime,
    settings: &Config,
    mbid: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mbid: Mbid = mbid.parse()?;

    rt.block_on(async {
        let store = open_store(settings).await?;
        let service = build_service(settings, store)?;

        let cover = service
            .get_cover_image(&mbid)
            .await
            .with_context(format!("fetching cover for {}", mbid))?;

        match format {
            OutputFormat::Json => {
                let body = json!({ "mbid": mbid, "cover_image": cover });
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            OutputFormat::Text => match cover {
                Some(url) => println!("{}", url),
                None => println!("No cover art for {}", mbid),
            },
        }
        Ok::<_, anyhow::Error>(())
    })
}

// ============================================================================
// Text rendering
// ============================================================================

fn render_resolution(artist: &str, album: &str, response: &SearchResponse) -> String {
    match &response.mbid {
        Some(mbid) => format!(
            "{} - {}\nMBID: {}\nhttps://musicbrainz.org/release/{}\n",
            artist.trim(),
            album.trim(),
            mbid,
            mbid
        ),
        None => format!("No release found for {} - {}\n", artist.trim(), album.trim()),
    }
}

fn render_tracks(mbid: &Mbid, tracks: &[TrackInfo]) -> String {
    if tracks.is_empty() {
        return format!("Release {} has no known tracks\n", mbid);
    }

    let multi_disc = tracks
        .iter()
        .filter_map(|t| t.medium)
        .any(|m| m != tracks[0].medium.unwrap_or(m));

    let mut out = format!("Release {} ({} tracks)\n", mbid, tracks.len());
    for track in tracks {
        let number = track
            .number
            .clone()
            .unwrap_or_else(|| track.position.to_string());
        let number = match (multi_disc, track.medium) {
            (true, Some(medium)) => format!("{}-{}", medium, number),
            _ => number,
        };
        let length = track.length_ms.map(format_length).unwrap_or_else(|| "--:--".to_string());
        out.push_str(&format!("{:>5}  {:>6}  {}\n", number, length, track.title));
    }
    out
}

/// Milliseconds as `m:ss`.
fn format_length(ms: u64) -> String {
    let secs = (ms + 500) / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
