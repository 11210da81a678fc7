//! Album lookups

use rspotify::model::{FullAlbum, Page, SimplifiedTrack};

use super::error::ApiResult;
use super::http::{Backend, HttpClient};
use super::search::SearchResponse;

/// Albums matching `keyword`, 50 per page.
pub async fn album_list(http: &HttpClient, keyword: &str, offset: u32) -> ApiResult<SearchResponse> {
    http.get(
        Backend::Spotify,
        "/search",
        &[
            ("q", keyword.to_string()),
            ("type", "album".to_string()),
            ("limit", "50".to_string()),
            ("offset", offset.to_string()),
        ],
    )
    .await
}

/// A single album matching `letter`, used for the random pick on the home view.
pub async fn random_album(http: &HttpClient, letter: &str) -> ApiResult<SearchResponse> {
    http.get(
        Backend::Spotify,
        "/search",
        &[
            ("q", letter.to_string()),
            ("type", "album".to_string()),
            ("limit", "1".to_string()),
        ],
    )
    .await
}

pub async fn album_tracks(http: &HttpClient, album_id: &str) -> ApiResult<Page<SimplifiedTrack>> {
    http.get(
        Backend::Spotify,
        &format!("/albums/{}/tracks", album_id),
        &[("limit", "10".to_string())],
    )
    .await
}

pub async fn album_detail(http: &HttpClient, album_id: &str) -> ApiResult<FullAlbum> {
    http.get(Backend::Spotify, &format!("/albums/{}", album_id), &[]).await
}
