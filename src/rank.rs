//! Relevance ranking and deduplication for search results.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::catalog::models::Track;

/// Relevance of one track against a query. Binary substring containment,
/// case-insensitive; an artist hit outweighs a title hit two to one.
pub fn score(track: &Track, query: &str) -> u32 {
    let query = query.to_lowercase();
    let mut score = 0;
    if track.artist.to_lowercase().contains(&query) {
        score += 2;
    }
    if track.title.to_lowercase().contains(&query) {
        score += 1;
    }
    score
}

/// Deduplicate and relevance-sort search results.
///
/// Duplicates share a lowercase title+artist key; the first occurrence
/// wins. The sort is stable: ties keep the order the mirror produced.
pub fn rank_tracks(tracks: Vec<Track>, query: &str) -> Vec<Track> {
    let mut seen = HashSet::new();
    let mut deduped: Vec<Track> = tracks
        .into_iter()
        .filter(|t| {
            seen.insert(format!(
                "{}|{}",
                t.title.to_lowercase(),
                t.artist.to_lowercase()
            ))
        })
        .collect();

    deduped.sort_by_key(|t| Reverse(score(t, query)));
    deduped
}
