//! Playback keyboard shortcuts
//!
//! Space, the four arrows and `L`. Each handler runs to completion before the
//! key loop reads the next event, so shortcuts never interleave.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::AppController;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    TogglePlay,
    NextTrack,
    PreviousTrack,
    VolumeUp,
    VolumeDown,
    ToggleLyrics,
}

impl Shortcut {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        match key.code {
            KeyCode::Char(' ') => Some(Shortcut::TogglePlay),
            KeyCode::Right => Some(Shortcut::NextTrack),
            KeyCode::Left => Some(Shortcut::PreviousTrack),
            KeyCode::Up => Some(Shortcut::VolumeUp),
            KeyCode::Down => Some(Shortcut::VolumeDown),
            KeyCode::Char('l') | KeyCode::Char('L') => Some(Shortcut::ToggleLyrics),
            _ => None,
        }
    }
}

impl AppController {
    pub async fn dispatch_shortcut(&self, shortcut: Shortcut) {
        tracing::debug!(?shortcut, "Dispatching shortcut");
        match shortcut {
            Shortcut::TogglePlay => self.toggle_play().await,
            Shortcut::NextTrack => self.step_track(true).await,
            Shortcut::PreviousTrack => self.step_track(false).await,
            Shortcut::VolumeUp => self.change_volume(self.settings.volume_step).await,
            Shortcut::VolumeDown => self.change_volume(-self.settings.volume_step).await,
            Shortcut::ToggleLyrics => self.toggle_lyrics().await,
        }
    }

    /// Pause, resume, or start the current track on first play. Once the
    /// player accepts, the local flag is set to the commanded state, whatever
    /// a sync wrote in the meantime.
    pub async fn toggle_play(&self) {
        let state = self.model.lock().await.playback().await;
        if state.device_id().is_empty() {
            tracing::debug!("No device, ignoring play/pause");
            return;
        }

        let start_uri = match state.current_track() {
            Some(track) if state.first_play() && !state.is_playing() && !track.uri.is_empty() => {
                Some(track.uri.clone())
            }
            _ => None,
        };

        let was_playing = state.is_playing();
        let result = if was_playing {
            self.player.pause().await
        } else if let Some(uri) = &start_uri {
            self.player.play(uri, state.device_id()).await
        } else {
            self.player.resume().await
        };

        match result {
            Ok(()) => {
                let model = self.model.lock().await;
                let now_playing = model
                    .update_playback(|p| {
                        p.set_playing(!was_playing);
                        if start_uri.is_some() {
                            p.mark_played();
                        }
                        p.is_playing()
                    })
                    .await;
                tracing::info!(action = if now_playing { "resumed" } else { "paused" }, "Playback toggled");
            }
            Err(e) => self.report("toggle_play", &e).await,
        }
    }

    /// Move through the track list and play the new current track. The index
    /// moves before the remote call and stays moved if the call fails.
    pub async fn step_track(&self, forward: bool) {
        let target = {
            let model = self.model.lock().await;
            model
                .update_playback(|p| {
                    if p.device_id().is_empty() || p.track_list().is_empty() {
                        return None;
                    }
                    if forward {
                        p.advance();
                    } else {
                        p.retreat();
                    }
                    let uri = p.current_track().map(|t| t.uri.clone()).unwrap_or_default();
                    Some((uri, p.device_id().to_string()))
                })
                .await
        };

        let Some((uri, device_id)) = target else {
            tracing::debug!(forward, "No device or empty list, ignoring track step");
            return;
        };
        if uri.is_empty() {
            tracing::warn!("Current track has no uri, not playing it");
            return;
        }

        match self.player.play(&uri, &device_id).await {
            Ok(()) => {
                let model = self.model.lock().await;
                model
                    .update_playback(|p| {
                        p.set_playing(true);
                        p.mark_played();
                    })
                    .await;
                tracing::info!(uri = %uri, "Playing track");
                let lyrics_visible = model.toggles().await.lyrics_visible;
                drop(model);
                if lyrics_visible {
                    self.fetch_lyrics().await;
                }
            }
            Err(e) => self.report("step_track", &e).await,
        }
    }

    /// Volume lives in the store; a set device also gets the new level.
    pub async fn change_volume(&self, delta: f32) {
        let (percent, device_id) = {
            let model = self.model.lock().await;
            model
                .update_playback(|p| {
                    p.set_volume(p.current_volume() + delta);
                    (p.volume_percent(), p.device_id().to_string())
                })
                .await
        };
        tracing::debug!(percent, "Volume changed");

        if !device_id.is_empty() {
            if let Err(e) = self.player.set_volume(percent).await {
                tracing::warn!(error = %e, percent, "Remote volume change failed");
            }
        }
    }

    pub async fn toggle_lyrics(&self) {
        let visible = self.model.lock().await.toggle_lyrics().await;
        if visible {
            self.fetch_lyrics().await;
        }
    }

    /// Fetch lyrics for the current track in the background
    pub(crate) async fn fetch_lyrics(&self) {
        let track = {
            let model = self.model.lock().await;
            let Some(track) = model.playback().await.current_track().cloned() else {
                return;
            };
            if !model.begin_lyrics(&track.uri).await {
                return;
            }
            track
        };

        let controller = self.clone();
        tokio::spawn(async move {
            let artist = track.artists.first().cloned().unwrap_or_default();
            let text = match controller.lyrics.find_lyrics(&track.title, &artist).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, title = %track.title, "Lyrics lookup failed");
                    None
                }
            };
            controller.model.lock().await.finish_lyrics(&track.uri, text).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::harness;
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_shortcut_keys() {
        assert_eq!(Shortcut::from_key(&key(KeyCode::Char(' '))), Some(Shortcut::TogglePlay));
        assert_eq!(Shortcut::from_key(&key(KeyCode::Right)), Some(Shortcut::NextTrack));
        assert_eq!(Shortcut::from_key(&key(KeyCode::Left)), Some(Shortcut::PreviousTrack));
        assert_eq!(Shortcut::from_key(&key(KeyCode::Up)), Some(Shortcut::VolumeUp));
        assert_eq!(Shortcut::from_key(&key(KeyCode::Down)), Some(Shortcut::VolumeDown));
        assert_eq!(Shortcut::from_key(&key(KeyCode::Char('L'))), Some(Shortcut::ToggleLyrics));
        assert_eq!(Shortcut::from_key(&key(KeyCode::Char('z'))), None);

        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(Shortcut::from_key(&ctrl_l), None);
    }

    #[tokio::test]
    async fn space_plays_current_track_on_first_press_then_pauses_and_resumes() {
        let h = harness();
        h.load(&["a", "b"], "dev").await;

        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;
        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;
        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;

        assert_eq!(h.player.calls(), vec!["play a dev", "pause", "resume"]);
        let state = h.controller.model.lock().await.playback().await;
        assert!(state.is_playing());
        assert!(!state.first_play());
    }

    #[tokio::test]
    async fn space_without_track_resumes() {
        let h = harness();
        h.load(&[], "dev").await;

        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;
        assert_eq!(h.player.calls(), vec!["resume"]);
    }

    #[tokio::test]
    async fn failed_toggle_keeps_local_state() {
        let h = harness();
        h.load(&["a"], "dev").await;
        h.player.set_failing(true);

        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;

        let model = h.controller.model.lock().await;
        let state = model.playback().await;
        assert!(!state.is_playing());
        assert!(state.first_play());
        assert!(model.has_status().await);
    }

    #[tokio::test]
    async fn sync_landing_mid_toggle_does_not_invert_the_result() {
        let h = harness();
        h.load(&["a"], "dev").await;
        h.controller
            .model
            .lock()
            .await
            .update_playback(|p| {
                p.set_playing(true);
                p.mark_played();
            })
            .await;

        // The remote reports the pause before our own call returns
        *h.player.remote_flip.lock().unwrap() = Some((h.controller.model.clone(), false));
        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;
        assert!(!h.controller.model.lock().await.playback().await.is_playing());

        *h.player.remote_flip.lock().unwrap() = Some((h.controller.model.clone(), true));
        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;
        assert!(h.controller.model.lock().await.playback().await.is_playing());

        assert_eq!(h.player.calls(), vec!["pause", "resume"]);
    }

    #[tokio::test]
    async fn right_arrow_wraps_and_plays_new_track() {
        let h = harness();
        h.load(&["a", "b", "c"], "dev").await;
        h.controller
            .model
            .lock()
            .await
            .update_playback(|p| p.set_current_index(2))
            .await;

        h.controller.dispatch_shortcut(Shortcut::NextTrack).await;

        assert_eq!(h.player.calls(), vec!["play a dev"]);
        let state = h.controller.model.lock().await.playback().await;
        assert_eq!(state.current_index(), 0);
        assert!(state.is_playing());
    }

    #[tokio::test]
    async fn left_arrow_keeps_new_index_when_play_fails() {
        let h = harness();
        h.load(&["a", "b", "c"], "dev").await;
        h.player.set_failing(true);

        h.controller.dispatch_shortcut(Shortcut::PreviousTrack).await;

        assert_eq!(h.player.calls(), vec!["play c dev"]);
        let state = h.controller.model.lock().await.playback().await;
        assert_eq!(state.current_index(), 2);
        assert!(!state.is_playing());
    }

    #[tokio::test]
    async fn playback_keys_need_a_device() {
        let h = harness();
        h.load(&["a", "b"], "").await;

        h.controller.dispatch_shortcut(Shortcut::TogglePlay).await;
        h.controller.dispatch_shortcut(Shortcut::NextTrack).await;
        h.controller.dispatch_shortcut(Shortcut::PreviousTrack).await;

        assert!(h.player.calls().is_empty());
        let state = h.controller.model.lock().await.playback().await;
        assert_eq!(state.current_index(), 0);
        assert!(!state.is_playing());
    }

    #[tokio::test]
    async fn volume_steps_are_clamped_and_sent_to_device() {
        let h = harness();
        h.load(&[], "dev").await;

        for _ in 0..8 {
            h.controller.dispatch_shortcut(Shortcut::VolumeUp).await;
        }
        let state = h.controller.model.lock().await.playback().await;
        assert_eq!(state.current_volume(), 1.0);

        h.controller.dispatch_shortcut(Shortcut::VolumeDown).await;
        let calls = h.player.calls();
        assert_eq!(calls.last().map(String::as_str), Some("volume 90"));
        assert_eq!(calls.first().map(String::as_str), Some("volume 60"));
    }

    #[tokio::test]
    async fn volume_changes_locally_without_device() {
        let h = harness();
        h.controller.dispatch_shortcut(Shortcut::VolumeDown).await;

        assert!(h.player.calls().is_empty());
        let state = h.controller.model.lock().await.playback().await;
        assert!((state.current_volume() - 0.4).abs() < 1e-6);
    }

    #[tokio::test]
    async fn lyrics_toggle_flips_visibility() {
        let h = harness();
        h.controller.dispatch_shortcut(Shortcut::ToggleLyrics).await;
        assert!(h.controller.model.lock().await.toggles().await.lyrics_visible);
        h.controller.dispatch_shortcut(Shortcut::ToggleLyrics).await;
        assert!(!h.controller.model.lock().await.toggles().await.lyrics_visible);
    }
}
