//! Playlist lookups

use rspotify::model::{FullPlaylist, Page, PlaylistItem};

use super::error::ApiResult;
use super::http::{Backend, HttpClient};

pub const PLAYLIST_PAGE_SIZE: u32 = 50;

pub async fn playlist(http: &HttpClient, playlist_id: &str) -> ApiResult<FullPlaylist> {
    http.get(Backend::Spotify, &format!("/playlists/{}", playlist_id), &[]).await
}

pub async fn playlist_tracks(
    http: &HttpClient,
    playlist_id: &str,
    limit: u32,
    offset: u32,
) -> ApiResult<Page<PlaylistItem>> {
    http.get(
        Backend::Spotify,
        &format!("/playlists/{}/tracks", playlist_id),
        &[("limit", limit.to_string()), ("offset", offset.to_string())],
    )
    .await
}
