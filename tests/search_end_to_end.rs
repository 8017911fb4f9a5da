//! End-to-end catalog operations against a mocked mirror.

use base64::Engine;
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use zuno_core::catalog::CatalogClient;
use zuno_core::errors::CatalogError;
use zuno_core::mirror::{MirrorClient, MirrorPool};
use zuno_core::rank::{rank_tracks, score};
use zuno_core::Quality;

fn catalog_for(server: &Server) -> CatalogClient {
    let mirror = MirrorClient::with_pool(MirrorPool::new(vec![server.url()]))
        .expect("client builds")
        .with_retry_policy(1, Duration::from_millis(1));
    CatalogClient::with_mirror(mirror)
}

#[tokio::test]
async fn search_maps_and_ranks_bare_data_array() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search/")
        .match_query(Matcher::UrlEncoded("s".into(), "Queen".into()))
        .with_status(200)
        .with_body(
            json!({"data": [{"id": "1", "title": "Bohemian Rhapsody", "artist": {"name": "Queen"}}]})
                .to_string(),
        )
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let tracks = catalog.search("Queen").await?;

    assert_eq!(tracks.len(), 1);
    let track = &tracks[0];
    assert_eq!(track.id, "1");
    assert_eq!(track.artist, "Queen");
    assert_eq!(track.album, "Unknown Album");
    assert!(!track.cover_url.is_empty());
    assert!(track.stream_url.is_empty());

    // Exact artist substring match: full artist weight plus no title hit.
    assert_eq!(score(track, "Queen"), 2);
    let ranked = rank_tracks(tracks, "Queen");
    assert_eq!(ranked.len(), 1);
    Ok(())
}

#[tokio::test]
async fn search_handles_nested_section_shape() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"data": {"tracks": {"items": [
                {"id": 7, "title": "Song A", "artists": [{"name": "First"}, {"name": "Second"}]},
                {"id": 8, "title": "Song B", "artistName": "Flat"}
            ]}}})
            .to_string(),
        )
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let tracks = catalog.search("song").await?;

    assert_eq!(tracks.len(), 2);
    // Multi-artist credits collapse to the primary contributor.
    assert_eq!(tracks[0].artist, "First");
    assert_eq!(tracks[1].artist, "Flat");
    Ok(())
}

#[tokio::test]
async fn empty_and_malformed_payloads_read_as_no_results() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"status": "ok", "weird": {"shape": true}}).to_string())
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    assert!(catalog.search("anything").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn stream_url_prefers_direct_field() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/track/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "42".into()),
            Matcher::UrlEncoded("quality".into(), "HIGH".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({"data": {
                "OriginalTrackUrl": "https://cdn.example/direct.flac",
                "manifest": "ignored"
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let url = catalog.get_stream_url("42", Quality::HIGH).await?;
    assert_eq!(url, "https://cdn.example/direct.flac");
    Ok(())
}

#[tokio::test]
async fn stream_url_decodes_manifest_when_no_direct_field() -> anyhow::Result<()> {
    let manifest = base64::engine::general_purpose::STANDARD
        .encode(r#"{"urls":["https://cdn.example/manifest.m4a"]}"#);

    let mut server = Server::new_async().await;
    server
        .mock("GET", "/track/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"manifest": manifest}).to_string())
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let url = catalog.get_stream_url("42", Quality::HIGH).await?;
    assert_eq!(url, "https://cdn.example/manifest.m4a");
    Ok(())
}

#[tokio::test]
async fn unresolvable_stream_is_a_typed_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/track/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"audioQuality": "LOSSLESS"}).to_string())
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let err = catalog
        .get_stream_url("42", Quality::HIGH)
        .await
        .expect_err("nothing to stream");
    assert!(matches!(err, CatalogError::StreamUnavailable(id) if id == "42"));
}

#[tokio::test]
async fn playlist_detail_populates_lazy_track_list() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/playlist/")
        .match_query(Matcher::UrlEncoded("id".into(), "uuid-1".into()))
        .with_status(200)
        .with_body(
            json!({
                "uuid": "uuid-1",
                "title": "Road Trip",
                "description": "Windows down",
                "tracks": {"items": [
                    {"id": 1, "title": "Mile One", "artist": {"name": "Driver"}}
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let playlist = catalog.get_playlist("uuid-1").await?;

    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.description.as_deref(), Some("Windows down"));
    assert_eq!(playlist.tracks.len(), 1);
    assert_eq!(playlist.tracks[0].artist, "Driver");
    Ok(())
}

#[tokio::test]
async fn album_tracks_inherit_album_artist_credit() -> anyhow::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/album/")
        .match_query(Matcher::UrlEncoded("id".into(), "9".into()))
        .with_status(200)
        .with_body(
            json!({
                "id": 9,
                "title": "The Album",
                "artist": {"name": "Band"},
                "items": [
                    {"id": 91, "title": "Opener"},
                    {"id": 92, "title": "Closer", "artist": {"name": "Band feat. Guest"}}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let catalog = catalog_for(&server);
    let tracks = catalog.get_album_tracks("9").await?;

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].artist, "Band");
    assert_eq!(tracks[1].artist, "Band feat. Guest");
    Ok(())
}
