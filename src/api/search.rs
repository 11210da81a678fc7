//! Spotify search

use rspotify::model::{FullArtist, FullTrack, Page, SimplifiedAlbum, SimplifiedPlaylist};
use serde::Deserialize;

use super::error::ApiResult;
use super::http::{Backend, HttpClient};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Artist,
    Album,
    Track,
    Playlist,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Artist => "artist",
            SearchKind::Album => "album",
            SearchKind::Track => "track",
            SearchKind::Playlist => "playlist",
        }
    }
}

const ALL_KINDS: [SearchKind; 4] = [
    SearchKind::Artist,
    SearchKind::Album,
    SearchKind::Track,
    SearchKind::Playlist,
];

/// Each category is present only when it was requested. Spotify may return
/// `null` playlist entries, hence the inner `Option`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Page<FullTrack>>,
    #[serde(default)]
    pub albums: Option<Page<SimplifiedAlbum>>,
    #[serde(default)]
    pub artists: Option<Page<FullArtist>>,
    #[serde(default)]
    pub playlists: Option<Page<Option<SimplifiedPlaylist>>>,
}

fn search_params(
    query: &str,
    kinds: &[SearchKind],
    limit: u32,
    offset: Option<u32>,
    market: Option<&str>,
) -> Vec<(&'static str, String)> {
    let types = kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(",");
    let mut params = vec![
        ("q", query.to_string()),
        ("type", types),
        ("limit", limit.to_string()),
    ];
    if let Some(offset) = offset {
        params.push(("offset", offset.to_string()));
    }
    if let Some(market) = market {
        params.push(("market", market.to_string()));
    }
    params
}

async fn search(http: &HttpClient, params: Vec<(&'static str, String)>) -> ApiResult<SearchResponse> {
    let query = params.first().map(|(_, q)| q.clone()).unwrap_or_default();
    crate::log_api_request!("search", query = %query);
    let result = http.get(Backend::Spotify, "/search", &params).await;
    crate::log_api_result!("search", result);
    result
}

/// Combined search across artists, albums, tracks and playlists.
pub async fn search_all(http: &HttpClient, query: &str) -> ApiResult<SearchResponse> {
    search(http, search_params(query, &ALL_KINDS, 20, None, None)).await
}

/// One category, paged 50 at a time.
pub async fn search_kind(
    http: &HttpClient,
    kind: SearchKind,
    query: &str,
    offset: u32,
) -> ApiResult<SearchResponse> {
    search(http, search_params(query, &[kind], 50, Some(offset), None)).await
}

/// Search by record label, used to fill the home view.
pub async fn search_label(
    http: &HttpClient,
    label: &str,
    limit: u32,
    kind: SearchKind,
) -> ApiResult<SearchResponse> {
    let query = format!("label:\"{}\"", label);
    search(http, search_params(&query, &[kind], limit, None, Some("JP"))).await
}

pub async fn recommended_artists(http: &HttpClient, term: &str) -> ApiResult<SearchResponse> {
    search(http, search_params(term, &[SearchKind::Artist], 6, None, None)).await
}

pub async fn search_artists(http: &HttpClient, query: &str, limit: u32) -> ApiResult<SearchResponse> {
    search(http, search_params(query, &[SearchKind::Artist], limit, None, None)).await
}

pub async fn search_tracks(http: &HttpClient, query: &str, limit: u32) -> ApiResult<SearchResponse> {
    search(http, search_params(query, &[SearchKind::Track], limit, None, None)).await
}

pub async fn search_playlists(http: &HttpClient, query: &str, limit: u32) -> ApiResult<SearchResponse> {
    search(http, search_params(query, &[SearchKind::Playlist], limit, None, None)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_search_requests_every_kind() {
        let params = search_params("daft punk", &ALL_KINDS, 20, None, None);
        assert_eq!(
            params,
            vec![
                ("q", "daft punk".to_string()),
                ("type", "artist,album,track,playlist".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn paged_search_with_market() {
        let params = search_params("x", &[SearchKind::Album], 50, Some(100), Some("JP"));
        assert!(params.contains(&("offset", "100".to_string())));
        assert!(params.contains(&("market", "JP".to_string())));
        assert!(params.contains(&("type", "album".to_string())));
    }

    #[test]
    fn response_tolerates_missing_categories_and_null_playlists() {
        let body = r#"{
            "playlists": {
                "href": "https://api.spotify.com/v1/search",
                "items": [null],
                "limit": 20, "next": null, "offset": 0, "previous": null, "total": 1
            }
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert!(response.tracks.is_none());
        assert!(response.albums.is_none());
        let playlists = response.playlists.unwrap();
        assert_eq!(playlists.items.len(), 1);
        assert!(playlists.items[0].is_none());
    }

    #[tokio::test]
    async fn specialised_searches_shape_their_queries() {
        let recorder = crate::api::recorder::spawn().await;
        let http = &recorder.http;

        search_kind(http, SearchKind::Track, "blue", 100).await.unwrap();
        search_label(http, "Avex", 12, SearchKind::Album).await.unwrap();
        recommended_artists(http, "jazz").await.unwrap();
        search_artists(http, "miles", 5).await.unwrap();
        search_tracks(http, "so what", 5).await.unwrap();
        search_playlists(http, "focus", 5).await.unwrap();

        let requests = recorder.requests();
        assert_eq!(requests.len(), 6);
        assert!(requests.iter().all(|r| r.starts_with("GET /search?")));
        assert!(requests[0].contains("type=track") && requests[0].contains("limit=50") && requests[0].contains("offset=100"));
        assert!(requests[1].contains("label%3A%22Avex%22") && requests[1].contains("market=JP"));
        assert!(requests[2].contains("type=artist") && requests[2].contains("limit=6"));
        assert!(requests[3].contains("type=artist&limit=5"));
        assert!(requests[4].contains("type=track&limit=5"));
        assert!(requests[5].contains("type=playlist&limit=5"));
    }
}
