//! Local Spotify Connect device backed by librespot

use anyhow::{Context, Result};
use librespot::connect::{ConnectConfig, Spirc};
use librespot::core::authentication::Credentials;
use librespot::core::config::SessionConfig;
use librespot::core::session::Session;
use librespot::playback::config::{AudioFormat, Bitrate, PlayerConfig};
use librespot::playback::mixer::{self, MixerConfig, NoOpVolume};
use librespot::playback::audio_backend;
use librespot::playback::player::Player;

/// A running Spotify Connect device on this machine
pub struct LocalDevice {
    session: Session,
    spirc: Spirc,
}

impl LocalDevice {
    pub async fn start(access_token: &str, device_name: &str) -> Result<Self> {
        tracing::info!(device = device_name, "Starting local playback device");

        let session_config = SessionConfig {
            device_id: device_id(device_name),
            ..Default::default()
        };
        let player_config = PlayerConfig {
            bitrate: Bitrate::Bitrate320,
            ..Default::default()
        };
        let connect_config = ConnectConfig {
            name: device_name.to_string(),
            ..Default::default()
        };
        let audio_format = AudioFormat::default();

        let sink_builder = audio_backend::find(None).context("No audio backend available")?;
        let mixer_builder = mixer::find(None).context("No mixer available")?;
        let mixer = mixer_builder(MixerConfig::default())?;

        let session = Session::new(session_config, None);
        let player = Player::new(player_config, session.clone(), Box::new(NoOpVolume), move || {
            sink_builder(None, audio_format)
        });

        let credentials = Credentials::with_access_token(access_token);
        let (spirc, spirc_task) = Spirc::new(connect_config, session.clone(), credentials, player, mixer)
            .await
            .context("Failed to start Spotify Connect")?;

        tokio::spawn(async move {
            spirc_task.await;
            tracing::debug!("Spirc task finished");
        });

        tracing::info!(device = device_name, "Local playback device ready");
        Ok(Self {
            session,
            spirc,
        })
    }

    pub fn username(&self) -> String {
        self.session.username()
    }

    pub fn shutdown(&self) {
        if let Err(e) = self.spirc.shutdown() {
            tracing::warn!(error = %e, "Spirc shutdown failed");
        }
    }
}

/// Stable per-machine device id
fn device_id(device_name: &str) -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}-{}", device_name, hostname)
}
