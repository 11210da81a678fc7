//! Video listings from the local media backend

use serde::Deserialize;
use serde_json::Value;

use super::error::ApiResult;
use super::http::{Backend, HttpClient};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Video {
    #[serde(default, alias = "Key", alias = "id")]
    pub key: String,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "size")]
    pub bytes: Option<u64>,
}

impl Video {
    pub fn display_name(&self) -> &str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(&self.key)
    }
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    videos: Vec<Video>,
}

pub async fn videos(http: &HttpClient) -> ApiResult<Vec<Video>> {
    let response: VideosResponse = http.get(Backend::Movie, "/api/videos", &[]).await?;
    Ok(response.videos)
}

pub async fn video_images(http: &HttpClient) -> ApiResult<Vec<Video>> {
    let response: VideosResponse = http.get(Backend::Movie, "/api/imgs", &[]).await?;
    Ok(response.videos)
}

pub async fn video_info(http: &HttpClient, key: &str) -> ApiResult<Value> {
    http.get(Backend::Movie, "/api/videos/info", &[("key", key.to_string())]).await
}
