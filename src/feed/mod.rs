//! Personalized home feed composition.
//!
//! Rotates through three strategies keyed by `offset % 3`, falling back to
//! a diversity-seeded genre section for listeners with no history, and to
//! a plain "mix" search when everything else goes wrong. The terminal
//! fallback never fails the caller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::catalog::models::{FeedSection, Track};
use crate::catalog::source::CatalogSource;
use crate::history::HistoryManager;
use crate::profile::{taste_from_history, TasteProfile};
use crate::rank::rank_tracks;

/// Tracks per composed section.
const SECTION_CAP: usize = 15;

/// How many most-played artists strategy 1 draws from.
const TOP_ARTIST_POOL: usize = 5;

/// How many of the selected artist's own tracks go into the mix before the
/// similar-track expansion fills the rest.
const ARTIST_OWN_TRACKS: usize = 5;

/// A slow mirror must not block the caller; past this the section resolves
/// through the fallback path.
const SECTION_TIMEOUT: Duration = Duration::from_secs(8);

/// Genre/mood seeds for listeners with no usable history.
const SEED_QUERIES: &[&str] = &[
    "Top 50 Global",
    "Viral Hits",
    "New Music Friday",
    "Rock Classics",
    "Jazz Vibes",
    "Lo-Fi Beats",
    "Electronic Essentials",
    "Hip Hop Heavyweights",
    "Indie Discoveries",
    "Latin Hits",
    "K-Pop Risers",
    "Piano Ballads",
    "Movie Soundtracks",
    "Acoustic Covers",
];

/// Most-played artists in the history, by frequency, capped to the
/// strategy-1 pool. Ties keep first-seen (most recent) order.
pub fn top_artists(history: &[Track]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for track in history {
        let entry = counts.entry(track.artist.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(track.artist.as_str());
        }
        *entry += 1;
    }

    order.sort_by_key(|artist| Reverse(counts[artist]));
    order
        .into_iter()
        .take(TOP_ARTIST_POOL)
        .map(str::to_string)
        .collect()
}

/// Search query bucket for the discovery strategy, thresholded on the
/// taste vector.
pub fn discovery_query(profile: &TasteProfile) -> &'static str {
    if profile.energy > 0.7 {
        "club hits"
    } else if profile.energy < 0.4 {
        "chill relaxing"
    } else if profile.valence > 0.7 {
        "happy pop"
    } else {
        "trending music"
    }
}

/// Composes rotating personalized feed sections from catalog search,
/// similar-track expansion and the local taste profile.
pub struct FeedComposer {
    source: Arc<dyn CatalogSource>,
    history: Arc<HistoryManager>,
    rng: Mutex<StdRng>,
}

impl FeedComposer {
    pub fn new(source: Arc<dyn CatalogSource>, history: Arc<HistoryManager>) -> Self {
        Self {
            source,
            history,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Pin every random choice (artist pick, seed query) for tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Current taste profile; a pure function of the play history.
    pub async fn user_profile(&self) -> TasteProfile {
        taste_from_history(&self.history.recent_plays().await)
    }

    /// Next feed section for `offset`. Tracks listed in `exclude_ids`
    /// (already on screen this session) never reappear. Infallible: any
    /// strategy failure or timeout degrades to the terminal fallback.
    pub async fn next_section(&self, offset: u64, exclude_ids: &[String]) -> FeedSection {
        match timeout(SECTION_TIMEOUT, self.compose(offset, exclude_ids)).await {
            Ok(Ok(section)) => {
                log::info!(
                    "Feed section '{}' ready ({} tracks)",
                    section.title,
                    section.tracks.len()
                );
                section
            }
            Ok(Err(e)) => {
                log::warn!("Feed strategy failed: {}", e);
                self.terminal_fallback(exclude_ids).await
            }
            Err(_) => {
                log::warn!("Feed composition timed out after {:?}", SECTION_TIMEOUT);
                self.terminal_fallback(exclude_ids).await
            }
        }
    }

    async fn compose(&self, offset: u64, exclude_ids: &[String]) -> anyhow::Result<FeedSection> {
        let history = self.history.recent_plays().await;

        match offset % 3 {
            0 if !history.is_empty() => self.artist_mix(&history, exclude_ids).await,
            1 if !history.is_empty() => self.jump_back_in(&history, exclude_ids).await,
            2 => self.daily_discovery(&history, exclude_ids).await,
            _ => self.explore_fallback(exclude_ids).await,
        }
    }

    /// Exclude-filter, rank against the strategy's seed text, cap.
    fn process(&self, tracks: Vec<Track>, exclude_ids: &[String], query: &str) -> Vec<Track> {
        let filtered: Vec<Track> = tracks
            .into_iter()
            .filter(|t| !exclude_ids.contains(&t.id))
            .collect();
        let mut ranked = rank_tracks(filtered, query);
        ranked.truncate(SECTION_CAP);
        ranked
    }

    /// Strategy 1: mix of one of the listener's top artists with similar
    /// tracks. Picks randomly within the top pool so the feed rotates.
    async fn artist_mix(
        &self,
        history: &[Track],
        exclude_ids: &[String],
    ) -> anyhow::Result<FeedSection> {
        let top = top_artists(history);
        let selected = {
            let mut rng = self.rng.lock().await;
            top[rng.random_range(0..top.len())].clone()
        };

        let own = self.source.search_tracks(&selected).await?;
        let seed = history
            .iter()
            .find(|t| t.artist == selected)
            .unwrap_or(&history[0]);
        let similar = self.source.similar_tracks(seed).await.unwrap_or_default();

        let combined: Vec<Track> = own
            .into_iter()
            .take(ARTIST_OWN_TRACKS)
            .chain(similar)
            .collect();

        Ok(FeedSection {
            title: format!("Mix of {}", selected),
            subtitle: format!("{} and similar artists", selected),
            tracks: self.process(combined, exclude_ids, &selected),
        })
    }

    /// Strategy 2: tracks similar to the single most recent play.
    async fn jump_back_in(
        &self,
        history: &[Track],
        exclude_ids: &[String],
    ) -> anyhow::Result<FeedSection> {
        let last = &history[0];
        let similar = self.source.similar_tracks(last).await?;

        Ok(FeedSection {
            title: "Jump back in".to_string(),
            subtitle: format!("Because you listened to {}", last.artist),
            tracks: self.process(similar, exclude_ids, &last.artist),
        })
    }

    /// Strategy 3: discovery search bucketed on the taste profile.
    async fn daily_discovery(
        &self,
        history: &[Track],
        exclude_ids: &[String],
    ) -> anyhow::Result<FeedSection> {
        let profile = taste_from_history(history);
        let query = discovery_query(&profile);
        let results = self.source.search_tracks(query).await?;

        Ok(FeedSection {
            title: "Daily discovery".to_string(),
            subtitle: "New picks for your taste".to_string(),
            tracks: self.process(results, exclude_ids, query),
        })
    }

    /// No-history fallback: a random seed query, greedily limited to one
    /// track per artist for visible variety. If the diversity filter eats
    /// too much, the raw result set is used instead.
    async fn explore_fallback(&self, exclude_ids: &[String]) -> anyhow::Result<FeedSection> {
        let query = {
            let mut rng = self.rng.lock().await;
            SEED_QUERIES[rng.random_range(0..SEED_QUERIES.len())]
        };

        let results: Vec<Track> = self
            .source
            .search_tracks(query)
            .await?
            .into_iter()
            .filter(|t| !exclude_ids.contains(&t.id))
            .collect();

        let mut seen_artists = HashSet::new();
        let diverse: Vec<Track> = results
            .iter()
            .filter(|t| seen_artists.insert(t.artist.clone()))
            .cloned()
            .collect();

        let mut tracks = if diverse.len() > 5 { diverse } else { results };
        tracks.truncate(SECTION_CAP);

        Ok(FeedSection {
            title: query.to_string(),
            subtitle: "Explore genres".to_string(),
            tracks,
        })
    }

    /// Terminal fallback. Must not fail: a dead catalog yields an empty
    /// section, never an error.
    async fn terminal_fallback(&self, exclude_ids: &[String]) -> FeedSection {
        let tracks = match self.source.search_tracks("mix").await {
            Ok(results) => {
                let mut tracks: Vec<Track> = results
                    .into_iter()
                    .filter(|t| !exclude_ids.contains(&t.id))
                    .collect();
                tracks.truncate(SECTION_CAP);
                tracks
            }
            Err(e) => {
                log::error!("Terminal feed fallback failed: {}", e);
                Vec::new()
            }
        };

        FeedSection {
            title: "Explore".to_string(),
            subtitle: "A bit of everything".to_string(),
            tracks,
        }
    }
}
