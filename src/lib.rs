//! Catalog access and personalization core for the ZUNO music player.
//!
//! Sits between the playback UI and a pool of unofficial, unreliable
//! music-metadata mirrors: resilient multi-mirror fetching, normalization
//! of inconsistently shaped payloads, canonical entity mapping (including
//! stream-manifest decoding), search ranking, and a taste-profile-driven
//! feed composer over local play history.

pub mod catalog;
pub mod errors;
pub mod feed;
pub mod history;
pub mod mirror;
pub mod normalize;
pub mod profile;
pub mod rank;

pub use catalog::{
    Album, Artist, CatalogClient, CatalogSource, FeedSection, Playlist, Quality, SearchResults,
    Track,
};
pub use errors::CatalogError;
pub use feed::FeedComposer;
pub use history::{HistoryManager, HistoryStore, MemoryStore};
pub use mirror::{MirrorClient, MirrorPool};
pub use normalize::{normalize, Page};
pub use profile::{taste_from_history, TasteProfile};
pub use rank::rank_tracks;
