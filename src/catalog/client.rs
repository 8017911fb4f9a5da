use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;

use super::mapper;
use super::models::{Album, Artist, Playlist, Quality, SearchResults, Track};
use super::source::CatalogSource;
use crate::errors::CatalogError;
use crate::mirror::MirrorClient;
use crate::normalize::normalize;

/// Default page size for section searches.
const SEARCH_LIMIT: &str = "10";

/// Mirror-backed catalog client.
///
/// Thin orchestration over the fetch client, the normalizer and the
/// mapper: every method is fetch → normalize → map.
pub struct CatalogClient {
    mirror: MirrorClient,
}

impl CatalogClient {
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            mirror: MirrorClient::new()?,
        })
    }

    pub fn with_mirror(mirror: MirrorClient) -> Self {
        Self { mirror }
    }

    /// Single-record payloads come wrapped in a `data` envelope on some
    /// mirrors and bare on others.
    fn unwrap_data(payload: &Value) -> &Value {
        payload.get("data").unwrap_or(payload)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let data = self
            .mirror
            .fetch_json("/search/", &[("s", query), ("limit", SEARCH_LIMIT)])
            .await?;
        let page = normalize(&data, "tracks");
        Ok(page
            .items
            .iter()
            .filter_map(|raw| mapper::map_track(raw, None))
            .collect())
    }

    pub async fn search_albums(&self, query: &str) -> Result<Vec<Album>, CatalogError> {
        let data = self
            .mirror
            .fetch_json("/search/", &[("al", query), ("limit", SEARCH_LIMIT)])
            .await?;
        let page = normalize(&data, "albums");
        Ok(page.items.iter().filter_map(mapper::map_album).collect())
    }

    pub async fn search_playlists(&self, query: &str) -> Result<Vec<Playlist>, CatalogError> {
        let data = self
            .mirror
            .fetch_json("/search/", &[("pl", query), ("limit", SEARCH_LIMIT)])
            .await?;
        let page = normalize(&data, "playlists");
        Ok(page.items.iter().filter_map(mapper::map_playlist).collect())
    }

    pub async fn search_artists(&self, query: &str) -> Result<Vec<Artist>, CatalogError> {
        let data = self
            .mirror
            .fetch_json("/search/", &[("a", query), ("limit", SEARCH_LIMIT)])
            .await?;
        let page = normalize(&data, "artists");
        Ok(page.items.iter().filter_map(mapper::map_artist).collect())
    }

    /// Combined search across all four sections. The sections touch
    /// disjoint data, so the four requests are issued concurrently.
    pub async fn search_all(&self, query: &str) -> Result<SearchResults, CatalogError> {
        let (tracks, albums, artists, playlists) = tokio::join!(
            self.search(query),
            self.search_albums(query),
            self.search_artists(query),
            self.search_playlists(query),
        );

        Ok(SearchResults {
            tracks: tracks?,
            albums: albums?,
            artists: artists?,
            playlists: playlists?,
        })
    }

    /// Resolve the playable stream URL for a track.
    ///
    /// Prefers a direct URL field, falls back to decoding the base64
    /// manifest, and fails with `StreamUnavailable` when neither yields a
    /// URL — the playback fallback beyond that point is UI policy.
    pub async fn get_stream_url(
        &self,
        track_id: &str,
        quality: Quality,
    ) -> Result<String, CatalogError> {
        let payload = self
            .mirror
            .fetch_json("/track/", &[("id", track_id), ("quality", quality.as_str())])
            .await?;
        let data = Self::unwrap_data(&payload);

        let direct = ["OriginalTrackUrl", "url", "streamUrl", "playbackUrl"]
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str));
        if let Some(url) = direct {
            log::debug!("Direct stream URL for track {}", track_id);
            return Ok(url.to_string());
        }

        if let Some(manifest) = data.get("manifest").and_then(Value::as_str) {
            if let Some(url) = mapper::decode_manifest(manifest) {
                log::debug!("Manifest stream URL for track {}", track_id);
                return Ok(url);
            }
        }

        Err(CatalogError::StreamUnavailable(track_id.to_string()))
    }

    pub async fn get_album(&self, album_id: &str) -> Result<Album, CatalogError> {
        let payload = self.mirror.fetch_json("/album/", &[("id", album_id)]).await?;
        mapper::map_album(Self::unwrap_data(&payload))
            .ok_or_else(|| CatalogError::NotFound(format!("album {}", album_id)))
    }

    pub async fn get_album_tracks(&self, album_id: &str) -> Result<Vec<Track>, CatalogError> {
        let payload = self.mirror.fetch_json("/album/", &[("id", album_id)]).await?;
        let data = Self::unwrap_data(&payload);

        // Album pages often omit per-track artist credits; the album's own
        // credit is the fallback.
        let album_artist = mapper::map_album(data).map(|a| a.artist);
        let page = normalize(&payload, "tracks");
        Ok(page
            .items
            .iter()
            .filter_map(|raw| mapper::map_track(raw, album_artist.as_deref()))
            .collect())
    }

    /// Fetch a playlist and populate its (lazily loaded) track list.
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist, CatalogError> {
        let payload = self
            .mirror
            .fetch_json("/playlist/", &[("id", playlist_id)])
            .await?;
        let data = Self::unwrap_data(&payload);

        let mut playlist = mapper::map_playlist(data)
            .ok_or_else(|| CatalogError::NotFound(format!("playlist {}", playlist_id)))?;
        playlist.tracks = normalize(&payload, "tracks")
            .items
            .iter()
            .filter_map(|raw| mapper::map_track(raw, None))
            .collect();
        Ok(playlist)
    }

    pub async fn get_artist(&self, artist_id: &str) -> Result<Artist, CatalogError> {
        let payload = self.mirror.fetch_json("/artist/", &[("id", artist_id)]).await?;
        let data = Self::unwrap_data(&payload);
        let item = data.get("artist").unwrap_or(data);
        mapper::map_artist(item)
            .ok_or_else(|| CatalogError::NotFound(format!("artist {}", artist_id)))
    }

    /// Catalog tracks for an artist page (`/artist/?f=`).
    pub async fn get_artist_tracks(&self, artist_id: &str) -> Result<Vec<Track>, CatalogError> {
        let payload = self.mirror.fetch_json("/artist/", &[("f", artist_id)]).await?;
        let data = Self::unwrap_data(&payload);

        let artist_name = data
            .get("artist")
            .and_then(|a| a.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let page = normalize(&payload, "tracks");
        Ok(page
            .items
            .iter()
            .filter_map(|raw| mapper::map_track(raw, artist_name.as_deref()))
            .collect())
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn search_tracks(&self, query: &str) -> anyhow::Result<Vec<Track>> {
        self.search(query).await.map_err(|e| anyhow!(e))
    }
}
