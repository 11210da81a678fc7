//! The user's liked library.
//!
//! The primary store is the custom backend, which keeps Spotify-shaped JSON
//! objects as they were posted; its responses are returned as raw JSON and
//! interpreted by the model. The Spotify `/me/*` endpoints are kept as a
//! fallback.

use rspotify::model::{CursorBasedPage, FullArtist, Page, SavedAlbum, SavedTrack, SimplifiedPlaylist};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use super::error::ApiResult;
use super::http::{Backend, HttpClient};

/// What a liked album-or-playlist entry refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionKind {
    Albums,
    Playlists,
}

impl CollectionKind {
    fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Albums => "albums",
            CollectionKind::Playlists => "playlists",
        }
    }
}

pub async fn saved_tracks(http: &HttpClient) -> ApiResult<Value> {
    http.get(Backend::Library, "/my-songs", &[]).await
}

pub async fn saved_collections(http: &HttpClient, kind: CollectionKind) -> ApiResult<Value> {
    http.get(
        Backend::Library,
        "/my-playList-or-albums",
        &[("type", kind.as_str().to_string())],
    )
    .await
}

pub async fn followed_artists(http: &HttpClient) -> ApiResult<Value> {
    http.get(Backend::Library, "/my-artist", &[]).await
}

async fn post_item(http: &HttpClient, operation: &'static str, path: &str, item: &Value) -> ApiResult<()> {
    crate::log_api_request!(operation, path);
    let result: ApiResult<IgnoredAny> = http.post(Backend::Library, path, item).await;
    crate::log_api_result!(operation, result);
    result.map(|_| ())
}

pub async fn add_favorite_song(http: &HttpClient, track: &Value) -> ApiResult<()> {
    post_item(http, "add_favorite_song", "/add-like-song", track).await
}

pub async fn remove_favorite_song(http: &HttpClient, track: &Value) -> ApiResult<()> {
    post_item(http, "remove_favorite_song", "/remove-like-song", track).await
}

pub async fn add_favorite_collection(http: &HttpClient, item: &Value) -> ApiResult<()> {
    post_item(http, "add_favorite_collection", "/add-like-playList-or-albums", item).await
}

pub async fn remove_favorite_collection(http: &HttpClient, item: &Value) -> ApiResult<()> {
    post_item(http, "remove_favorite_collection", "/remove-like-playList-or-albums", item).await
}

pub async fn add_favorite_artist(http: &HttpClient, artist: &Value) -> ApiResult<()> {
    post_item(http, "add_favorite_artist", "/add-artist", artist).await
}

pub async fn remove_favorite_artist(http: &HttpClient, artist: &Value) -> ApiResult<()> {
    post_item(http, "remove_favorite_artist", "/remove-artist", artist).await
}

#[derive(Debug, Deserialize)]
pub struct FollowedArtists {
    pub artists: CursorBasedPage<FullArtist>,
}

fn page_params(limit: u32, offset: u32) -> [(&'static str, String); 2] {
    [("limit", limit.to_string()), ("offset", offset.to_string())]
}

pub async fn spotify_saved_tracks(http: &HttpClient, limit: u32, offset: u32) -> ApiResult<Page<SavedTrack>> {
    http.get(Backend::Spotify, "/me/tracks", &page_params(limit, offset)).await
}

pub async fn spotify_saved_albums(http: &HttpClient, limit: u32, offset: u32) -> ApiResult<Page<SavedAlbum>> {
    http.get(Backend::Spotify, "/me/albums", &page_params(limit, offset)).await
}

pub async fn spotify_playlists(http: &HttpClient, limit: u32, offset: u32) -> ApiResult<Page<SimplifiedPlaylist>> {
    http.get(Backend::Spotify, "/me/playlists", &page_params(limit, offset)).await
}

pub async fn spotify_followed_artists(http: &HttpClient, limit: u32) -> ApiResult<FollowedArtists> {
    http.get(
        Backend::Spotify,
        "/me/following",
        &[("type", "artist".to_string()), ("limit", limit.to_string())],
    )
    .await
}
