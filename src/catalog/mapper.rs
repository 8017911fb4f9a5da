//! Raw record to canonical entity mapping. Pure, no I/O.

use base64::Engine;
use rand::Rng;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::models::{Album, Artist, Playlist, Track};

const IMAGE_CDN_BASE: &str = "https://resources.tidal.com/images";
const PLACEHOLDER_BASE: &str = "https://picsum.photos/seed";

pub const TRACK_COVER_SIZE: u32 = 320;
pub const ALBUM_COVER_SIZE: u32 = 640;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[\w\-.~:?#\[\]@!$&'()*+,;=%/]+"#).expect("valid URL pattern")
});

/// Build a cover/picture URL from an opaque mirror image id.
///
/// Image ids use `-` where the CDN path uses `/`. A missing id gets a
/// randomly seeded placeholder so the UI never renders a broken image.
pub fn cover_url(image_id: Option<&str>, size: u32) -> String {
    match image_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let path = id.replace('-', "/");
            format!("{}/{}/{}x{}.jpg", IMAGE_CDN_BASE, path, size, size)
        }
        None => {
            let seed: u32 = rand::rng().random();
            format!("{}/{}/{}", PLACEHOLDER_BASE, seed, size)
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// Mirror ids arrive as numbers or strings depending on the instance.
fn string_id(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve a display artist name, first non-empty wins:
/// `artist.name` → `artists[0].name` → string `artist` → `artistName` →
/// caller fallback → "Unknown Artist".
pub fn resolve_artist(raw: &Value, fallback: Option<&str>) -> String {
    non_empty(
        raw.get("artist")
            .and_then(|a| a.get("name"))
            .and_then(Value::as_str),
    )
    .or_else(|| {
        non_empty(
            raw.get("artists")
                .and_then(Value::as_array)
                .and_then(|a| a.first())
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str),
        )
    })
    .or_else(|| non_empty(raw.get("artist").and_then(Value::as_str)))
    .or_else(|| non_empty(raw.get("artistName").and_then(Value::as_str)))
    .or_else(|| non_empty(fallback))
    .unwrap_or("Unknown Artist")
    .to_string()
}

/// Map one raw track record. Records without an id or title are dropped.
///
/// `fallback_artist` covers records fetched from an artist page, where the
/// mirror omits the (implied) artist credit.
pub fn map_track(raw: &Value, fallback_artist: Option<&str>) -> Option<Track> {
    let id = string_id(raw.get("id")?)?;
    let title = non_empty(raw.get("title").and_then(Value::as_str))?.to_string();

    let album = raw.get("album");
    let album_title = album
        .and_then(|a| a.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown Album")
        .to_string();
    let cover_id = album
        .and_then(|a| a.get("cover"))
        .and_then(Value::as_str)
        .or_else(|| raw.get("cover").and_then(Value::as_str));

    Some(Track {
        id,
        title,
        artist: resolve_artist(raw, fallback_artist),
        album: album_title,
        cover_url: cover_url(cover_id, TRACK_COVER_SIZE),
        duration: raw.get("duration").and_then(Value::as_u64).unwrap_or(0) as u32,
        stream_url: String::new(),
    })
}

pub fn map_album(raw: &Value) -> Option<Album> {
    let id = string_id(raw.get("id")?)?;
    let title = non_empty(raw.get("title").and_then(Value::as_str))?.to_string();

    let year = raw
        .get("releaseDate")
        .and_then(Value::as_str)
        .map(|d| d.chars().take(4).collect())
        .or_else(|| raw.get("year").and_then(Value::as_u64).map(|y| y.to_string()));

    Some(Album {
        id,
        title,
        artist: resolve_artist(raw, None),
        cover_url: cover_url(
            raw.get("cover").and_then(Value::as_str),
            ALBUM_COVER_SIZE,
        ),
        year,
    })
}

pub fn map_artist(raw: &Value) -> Option<Artist> {
    let id = string_id(raw.get("id")?)?;
    let name = non_empty(raw.get("name").and_then(Value::as_str))?.to_string();

    Some(Artist {
        id,
        name,
        picture_url: cover_url(
            raw.get("picture").and_then(Value::as_str),
            ALBUM_COVER_SIZE,
        ),
    })
}

pub fn map_playlist(raw: &Value) -> Option<Playlist> {
    let id = raw
        .get("uuid")
        .or_else(|| raw.get("id"))
        .and_then(string_id)?;
    let name = non_empty(
        raw.get("title")
            .and_then(Value::as_str)
            .or_else(|| raw.get("name").and_then(Value::as_str)),
    )?
    .to_string();

    let cover_id = raw
        .get("squareImage")
        .or_else(|| raw.get("image"))
        .or_else(|| raw.get("cover"))
        .and_then(Value::as_str);

    Some(Playlist {
        id,
        name,
        description: non_empty(raw.get("description").and_then(Value::as_str))
            .map(str::to_string),
        cover_url: cover_id.map(|c| cover_url(Some(c), ALBUM_COVER_SIZE)),
        tracks: Vec::new(),
    })
}

/// Decode a base64 playback manifest into a direct stream URL.
///
/// Tries JSON (`urls[0]`) first, then a URL-shaped pattern scan over the
/// decoded text. Decode and parse failures mean "no URL found", never an
/// error.
pub fn decode_manifest(manifest: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(manifest.trim())
        .ok()?;
    let decoded = String::from_utf8(bytes).ok()?;

    if let Ok(parsed) = serde_json::from_str::<Value>(&decoded) {
        if let Some(url) = parsed
            .get("urls")
            .and_then(Value::as_array)
            .and_then(|urls| urls.first())
            .and_then(Value::as_str)
        {
            return Some(url.to_string());
        }
    }

    URL_PATTERN.find(&decoded).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use serde_json::json;

    fn b64(s: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(s)
    }

    #[test]
    fn cover_url_rewrites_dashes() {
        let url = cover_url(Some("ab-cd-ef"), 320);
        assert_eq!(
            url,
            "https://resources.tidal.com/images/ab/cd/ef/320x320.jpg"
        );
    }

    #[test]
    fn missing_cover_gets_placeholder() {
        let url = cover_url(None, 640);
        assert!(url.starts_with("https://picsum.photos/seed/"));
        assert!(url.ends_with("/640"));

        let url = cover_url(Some(""), 640);
        assert!(url.starts_with("https://picsum.photos/seed/"));
    }

    #[test]
    fn artist_resolution_order() {
        let nested = json!({"artist": {"name": "Nested"}, "artists": [{"name": "Listed"}]});
        assert_eq!(resolve_artist(&nested, None), "Nested");

        let listed = json!({"artists": [{"name": "X"}]});
        assert_eq!(resolve_artist(&listed, None), "X");

        let plain = json!({"artist": "Plain"});
        assert_eq!(resolve_artist(&plain, None), "Plain");

        let named = json!({"artistName": "Named"});
        assert_eq!(resolve_artist(&named, None), "Named");

        let empty = json!({});
        assert_eq!(resolve_artist(&empty, Some("Page Artist")), "Page Artist");
        assert_eq!(resolve_artist(&empty, None), "Unknown Artist");
    }

    #[test]
    fn empty_artist_fields_are_skipped() {
        let raw = json!({"artist": {"name": ""}, "artistName": "Real"});
        assert_eq!(resolve_artist(&raw, None), "Real");
    }

    #[test]
    fn maps_track_with_numeric_id() {
        let raw = json!({
            "id": 77,
            "title": "Song",
            "artist": {"name": "Band"},
            "album": {"title": "LP", "cover": "aa-bb"},
            "duration": 215
        });
        let track = map_track(&raw, None).unwrap();
        assert_eq!(track.id, "77");
        assert_eq!(track.artist, "Band");
        assert_eq!(track.album, "LP");
        assert_eq!(track.duration, 215);
        assert!(track.cover_url.contains("aa/bb"));
        assert!(track.stream_url.is_empty());
    }

    #[test]
    fn drops_records_without_id_or_title() {
        assert!(map_track(&json!({"title": "x"}), None).is_none());
        assert!(map_track(&json!({"id": 1}), None).is_none());
    }

    #[test]
    fn maps_playlist_by_uuid() {
        let raw = json!({"uuid": "ab-12", "title": "Road Trip", "description": ""});
        let playlist = map_playlist(&raw).unwrap();
        assert_eq!(playlist.id, "ab-12");
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.description, None);
        assert!(playlist.tracks.is_empty());
    }

    #[test]
    fn manifest_json_urls() {
        let manifest = b64(r#"{"urls":["http://a"]}"#);
        assert_eq!(decode_manifest(&manifest), Some("http://a".to_string()));
    }

    #[test]
    fn manifest_plain_text_url() {
        let manifest = b64("see https://cdn.example/stream.flac for audio");
        assert_eq!(
            decode_manifest(&manifest),
            Some("https://cdn.example/stream.flac".to_string())
        );
    }

    #[test]
    fn manifest_garbage_is_none() {
        assert_eq!(decode_manifest("!!not-base64!!"), None);
        assert_eq!(decode_manifest(&b64("no url here")), None);
        assert_eq!(decode_manifest(&b64(r#"{"urls":[]}"#)), None);
    }
}
