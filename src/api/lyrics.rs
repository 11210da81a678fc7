//! Lyrics lookups against the Happi music API

use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::http::{Backend, HttpClient};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MusicMatch {
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub haslyrics: bool,
    /// Absolute URL of the lyrics resource
    #[serde(default)]
    pub api_lyrics: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MusicSearch {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Vec<MusicMatch>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LyricsBody {
    #[serde(default)]
    pub lyrics: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LyricsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: LyricsBody,
}

/// Happi client. The key travels as the `apikey` query parameter.
#[derive(Clone)]
pub struct LyricsApi {
    http: HttpClient,
    api_key: String,
}

impl LyricsApi {
    pub fn new(http: HttpClient, api_key: String) -> Self {
        Self { http, api_key }
    }

    fn key(&self) -> ApiResult<String> {
        if self.api_key.is_empty() {
            return Err(ApiError::Missing("lyrics API key"));
        }
        Ok(self.api_key.clone())
    }

    pub async fn search_music(&self, query: &str, limit: u32) -> ApiResult<MusicSearch> {
        let params = [
            ("apikey", self.key()?),
            ("q", query.to_string()),
            ("limit", limit.to_string()),
        ];
        let result = self.http.get(Backend::Lyrics, "/music", &params).await;
        crate::log_api_result!("search_music", result);
        result
    }

    pub async fn lyrics_by_url(&self, lyrics_url: &str) -> ApiResult<LyricsResponse> {
        let result = self
            .http
            .get(Backend::Lyrics, lyrics_url, &[("apikey", self.key()?)])
            .await;
        crate::log_api_result!("lyrics_by_url", result);
        result
    }

    /// Search for `title` by `artist` and fetch the lyrics of the first hit
    /// that has any. `Ok(None)` when nothing matches.
    pub async fn find_lyrics(&self, title: &str, artist: &str) -> ApiResult<Option<String>> {
        let query = format!("{} {}", title, artist);
        let search = self.search_music(query.trim(), 10).await?;

        let Some(url) = search
            .result
            .iter()
            .find(|m| m.haslyrics)
            .and_then(|m| m.api_lyrics.clone())
        else {
            tracing::debug!(title, artist, "No lyrics match");
            return Ok(None);
        };

        let response = self.lyrics_by_url(&url).await?;
        if response.result.lyrics.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(response.result.lyrics))
        }
    }
}
