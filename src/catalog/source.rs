use anyhow::Result;
use async_trait::async_trait;

use super::models::Track;

/// Catalog operations the feed composer depends on.
///
/// Implemented by `CatalogClient` for the real mirrors; tests swap in a
/// scripted source.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Free-text track search.
    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>>;

    /// Collaborative "similar tracks" expansion around a seed track.
    /// Default implementation widens the seed's artist and title into
    /// catalog searches and drops the seed itself.
    async fn similar_tracks(&self, seed: &Track) -> Result<Vec<Track>> {
        let by_artist = self.search_tracks(&seed.artist).await.unwrap_or_default();
        let by_title = self.search_tracks(&seed.title).await.unwrap_or_default();

        let mut seen = std::collections::HashSet::new();
        let merged = by_artist
            .into_iter()
            .chain(by_title)
            .filter(|t| t.id != seed.id)
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        Ok(merged)
    }
}
