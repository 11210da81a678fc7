//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and issues remote playback commands.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event routing (modals, search box, focus areas)
//! - `shortcuts`: The playback keyboard shortcuts
//! - `playback`: Remote player commands outside the shortcut set
//! - `navigation`: Library/search/detail navigation and the liked library
//! - `device`: Device picker and local device adoption
//! - `sync`: Periodic reconciliation with the remote player

mod input;
mod shortcuts;
mod playback;
mod navigation;
mod device;
mod sync;

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::{ApiError, HttpClient, LyricsApi, PlaybackApi};
use crate::config::Config;
use crate::model::AppModel;
use crate::theme::{Appearance, ThemeController};

pub use input::is_force_quit;
pub use shortcuts::Shortcut;

/// Tunables the controller reads from configuration
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    pub volume_step: f32,
    pub market: String,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            volume_step: config.player.volume_step,
            market: config.spotify.market.clone(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            volume_step: 0.1,
            market: "US".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: Arc<dyn PlaybackApi>,
    pub(crate) http: HttpClient,
    pub(crate) lyrics: LyricsApi,
    pub(crate) theme: Arc<Mutex<ThemeController>>,
    pub(crate) settings: ControllerSettings,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        player: Arc<dyn PlaybackApi>,
        http: HttpClient,
        lyrics: LyricsApi,
        theme: Arc<Mutex<ThemeController>>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            model,
            player,
            http,
            lyrics,
            theme,
            settings,
        }
    }

    /// Apply OS appearance changes for the rest of the session
    pub fn follow_os_appearance(&self, mut changes: UnboundedReceiver<Appearance>) {
        let theme = self.theme.clone();
        tokio::spawn(async move {
            while let Some(preference) = changes.recv().await {
                theme.lock().await.on_os_preference_changed(preference);
            }
        });
    }

    /// Log a failed remote call and surface it on the status line
    pub(crate) async fn report(&self, action: &'static str, error: &ApiError) {
        tracing::error!(action, error = %error, "Remote call failed");
        let model = self.model.lock().await;
        model.set_status(Self::format_error(error)).await;
    }

    pub(crate) fn format_error(error: &ApiError) -> String {
        match error.status() {
            Some(404) => "No active device found. Pick one with 'd' and try again.".to_string(),
            Some(403) => "Action forbidden. Check your Spotify Premium status.".to_string(),
            Some(401) => "Authentication expired. Please restart the app.".to_string(),
            Some(429) => "Rate limited. Please wait a moment.".to_string(),
            _ => match error {
                ApiError::Transport(_) => "Network error. Check your connection.".to_string(),
                other => format!("Error: {}", other),
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_common_statuses() {
        let status = |status| ApiError::Status {
            status,
            body: String::new(),
        };
        assert!(AppController::format_error(&status(404)).contains("No active device"));
        assert!(AppController::format_error(&status(403)).contains("Premium"));
        assert!(AppController::format_error(&status(401)).contains("Authentication"));
        assert!(AppController::format_error(&status(429)).contains("Rate limited"));
        assert_eq!(
            AppController::format_error(&ApiError::Missing("track uri")),
            "Error: Missing track uri"
        );
    }
}
