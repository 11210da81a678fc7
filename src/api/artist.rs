//! Artist lookups

use rspotify::model::{FullArtist, FullTrack, Page, SimplifiedAlbum};
use serde::Deserialize;

use super::error::ApiResult;
use super::http::{Backend, HttpClient};

#[derive(Debug, Deserialize)]
pub struct TopTracks {
    pub tracks: Vec<FullTrack>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedArtists {
    pub artists: Vec<FullArtist>,
}

pub async fn artist(http: &HttpClient, artist_id: &str) -> ApiResult<FullArtist> {
    http.get(Backend::Spotify, &format!("/artists/{}", artist_id), &[]).await
}

pub async fn top_tracks(http: &HttpClient, artist_id: &str, market: &str) -> ApiResult<TopTracks> {
    http.get(
        Backend::Spotify,
        &format!("/artists/{}/top-tracks", artist_id),
        &[("market", market.to_string())],
    )
    .await
}

pub async fn artist_albums(
    http: &HttpClient,
    artist_id: &str,
    limit: u32,
    offset: u32,
) -> ApiResult<Page<SimplifiedAlbum>> {
    http.get(
        Backend::Spotify,
        &format!("/artists/{}/albums", artist_id),
        &[("limit", limit.to_string()), ("offset", offset.to_string())],
    )
    .await
}

pub async fn related_artists(http: &HttpClient, artist_id: &str) -> ApiResult<RelatedArtists> {
    http.get(Backend::Spotify, &format!("/artists/{}/related-artists", artist_id), &[])
        .await
}
