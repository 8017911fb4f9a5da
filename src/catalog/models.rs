use serde::{Deserialize, Serialize};

/// Canonical track record.
///
/// `id` is mirror-scoped: stable for repeated calls to the same mirror but
/// not across mirrors. `stream_url` stays empty until resolved on demand
/// via `CatalogClient::get_stream_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: String,
    pub duration: u32,
    #[serde(default)]
    pub stream_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub picture_url: String,
}

/// Track list is populated lazily; it is empty straight out of a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Combined results for one query across all catalog sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub playlists: Vec<Playlist>,
}

/// One rotating section of the personalized home feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSection {
    pub title: String,
    pub subtitle: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Quality {
    LOSSLESS,
    HIGH,
    LOW,
}

impl Quality {
    pub fn as_str(&self) -> &str {
        match self {
            Quality::LOSSLESS => "LOSSLESS",
            Quality::HIGH => "HIGH",
            Quality::LOW => "LOW",
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::HIGH
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOSSLESS" => Ok(Quality::LOSSLESS),
            "HIGH" => Ok(Quality::HIGH),
            "LOW" => Ok(Quality::LOW),
            _ => Err(format!("Invalid quality: {}", s)),
        }
    }
}
