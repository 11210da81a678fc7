//! Remote player control (`/me/player`)

use async_trait::async_trait;
use rspotify::model::{CurrentPlaybackContext, Device};
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::json;

use super::error::{ApiError, ApiResult};
use super::http::{Backend, HttpClient};

/// Commands understood by the remote player.
///
/// The keyboard controller only talks to this trait, so it can run against a
/// recording fake in tests.
#[async_trait]
pub trait PlaybackApi: Send + Sync {
    async fn play(&self, track_uri: &str, device_id: &str) -> ApiResult<()>;
    async fn pause(&self) -> ApiResult<()>;
    async fn resume(&self) -> ApiResult<()>;
    async fn next(&self) -> ApiResult<()>;
    async fn previous(&self) -> ApiResult<()>;
    async fn set_volume(&self, percent: u8) -> ApiResult<()>;
    async fn seek(&self, position_ms: u32, device_id: &str) -> ApiResult<()>;
    async fn current_playback(&self) -> ApiResult<Option<CurrentPlaybackContext>>;
    async fn devices(&self) -> ApiResult<Vec<Device>>;
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<Device>,
}

/// `PlaybackApi` over the Spotify Web API
#[derive(Clone)]
pub struct SystemApi {
    http: HttpClient,
}

impl SystemApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    async fn command(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> ApiResult<()> {
        crate::log_api_request!(operation, path);
        let result: ApiResult<IgnoredAny> = self.http.put(Backend::Spotify, path, params, body).await;
        crate::log_api_result!(operation, result);
        result.map(|_| ())
    }
}

#[async_trait]
impl PlaybackApi for SystemApi {
    async fn play(&self, track_uri: &str, device_id: &str) -> ApiResult<()> {
        if track_uri.is_empty() {
            return Err(ApiError::Missing("track uri"));
        }
        let body = json!({ "uris": [track_uri] });
        let params = [("device_id", device_id.to_string())];
        self.command("play", "/me/player/play", &params, Some(&body)).await
    }

    async fn pause(&self) -> ApiResult<()> {
        self.command("pause", "/me/player/pause", &[], None).await
    }

    async fn resume(&self) -> ApiResult<()> {
        self.command("resume", "/me/player/play", &[], None).await
    }

    async fn next(&self) -> ApiResult<()> {
        self.command("next", "/me/player/next", &[], None).await
    }

    async fn previous(&self) -> ApiResult<()> {
        self.command("previous", "/me/player/previous", &[], None).await
    }

    async fn set_volume(&self, percent: u8) -> ApiResult<()> {
        let params = [("volume_percent", percent.min(100).to_string())];
        self.command("set_volume", "/me/player/volume", &params, None).await
    }

    async fn seek(&self, position_ms: u32, device_id: &str) -> ApiResult<()> {
        let params = [
            ("position_ms", position_ms.to_string()),
            ("device_id", device_id.to_string()),
        ];
        self.command("seek", "/me/player/seek", &params, None).await
    }

    async fn current_playback(&self) -> ApiResult<Option<CurrentPlaybackContext>> {
        tracing::trace!("Fetching current playback state");
        self.http.get(Backend::Spotify, "/me/player", &[]).await
    }

    async fn devices(&self) -> ApiResult<Vec<Device>> {
        let response: DevicesResponse = self.http.get(Backend::Spotify, "/me/player/devices", &[]).await?;
        Ok(response.devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn device_ids_are_encoded_as_query_values() {
        let recorder = crate::api::recorder::spawn().await;
        let player = SystemApi::new(recorder.http.clone());
        let device = "den&volume_percent=0 tv";

        player.play("spotify:track:1", device).await.unwrap();
        player.seek(42_000, device).await.unwrap();
        player.set_volume(130).await.unwrap();
        player.pause().await.unwrap();

        assert_eq!(
            recorder.requests(),
            vec![
                "PUT /me/player/play?device_id=den%26volume_percent%3D0+tv",
                "PUT /me/player/seek?position_ms=42000&device_id=den%26volume_percent%3D0+tv",
                "PUT /me/player/volume?volume_percent=100",
                "PUT /me/player/pause",
            ]
        );
    }

    #[tokio::test]
    async fn play_without_uri_sends_nothing() {
        let recorder = crate::api::recorder::spawn().await;
        let player = SystemApi::new(recorder.http.clone());

        let err = player.play("", "dev").await.unwrap_err();
        assert!(matches!(err, ApiError::Missing("track uri")));
        assert!(recorder.requests().is_empty());
    }
}
