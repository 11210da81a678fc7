//! Playback state store and UI toggles

use std::time::Instant;

use rspotify::model::{CurrentPlaybackContext, PlayableItem};
use rspotify::prelude::Id;

use super::types::Track;

/// Remote playback snapshot, as reported by the player endpoint
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemotePlayback {
    pub track_uri: Option<String>,
    pub is_playing: bool,
    pub progress_ms: u32,
    pub duration_ms: u32,
    pub device_id: Option<String>,
    pub device_name: String,
    pub volume_percent: Option<u32>,
}

impl RemotePlayback {
    pub fn from_context(playback: &CurrentPlaybackContext) -> Self {
        let (track_uri, duration) = match &playback.item {
            Some(PlayableItem::Track(track)) => (track.id.as_ref().map(|id| id.uri()), Some(track.duration)),
            Some(PlayableItem::Episode(episode)) => (Some(episode.id.uri()), Some(episode.duration)),
            _ => (None, None),
        };
        let millis = |d: chrono::TimeDelta| u32::try_from(d.num_milliseconds().max(0)).unwrap_or(u32::MAX);

        Self {
            track_uri,
            is_playing: playback.is_playing,
            progress_ms: playback.progress.map(millis).unwrap_or(0),
            duration_ms: duration.map(millis).unwrap_or(0),
            device_id: playback.device.id.clone(),
            device_name: playback.device.name.clone(),
            volume_percent: playback.device.volume_percent,
        }
    }
}

/// Current song list, position, volume and target device.
///
/// Every action is total: out-of-range requests are ignored rather than
/// reported, so the index always resolves to a track when the list is
/// non-empty and the volume always stays in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct PlaybackState {
    track_list: Vec<Track>,
    current_index: usize,
    is_playing: bool,
    volume: f32,
    device_id: String,
    device_name: String,
    first_play: bool,
    progress_ms: u32,
    duration_ms: u32,
    progress_at: Instant,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            track_list: Vec::new(),
            current_index: 0,
            is_playing: false,
            volume: 0.5,
            device_id: String::new(),
            device_name: String::new(),
            first_play: true,
            progress_ms: 0,
            duration_ms: 0,
            progress_at: Instant::now(),
        }
    }
}

impl PlaybackState {
    /// Replace the list and go back to its first entry
    pub fn set_track_list(&mut self, tracks: Vec<Track>) {
        self.track_list = tracks;
        self.current_index = 0;
    }

    pub fn set_current_index(&mut self, index: usize) {
        if index < self.track_list.len() {
            self.current_index = index;
        }
    }

    pub fn advance(&mut self) {
        let len = self.track_list.len();
        if len > 0 {
            self.current_index = (self.current_index + 1) % len;
        }
    }

    pub fn retreat(&mut self) {
        let len = self.track_list.len();
        if len > 0 {
            self.current_index = (self.current_index + len - 1) % len;
        }
    }

    /// NaN is treated as silence
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    pub fn toggle_playing(&mut self) {
        self.set_playing(!self.is_playing);
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        self.progress_ms = self.progress_ms();
        self.progress_at = Instant::now();
        self.is_playing = is_playing;
    }

    /// A track was started explicitly; progress restarts and the next
    /// space press resumes instead of replaying.
    pub fn mark_played(&mut self) {
        self.first_play = false;
        self.progress_ms = 0;
        self.progress_at = Instant::now();
        self.duration_ms = self.current_track().map(|t| t.duration_ms).unwrap_or(0);
    }

    pub fn set_progress(&mut self, progress_ms: u32) {
        self.progress_ms = if self.duration_ms > 0 { progress_ms.min(self.duration_ms) } else { progress_ms };
        self.progress_at = Instant::now();
    }

    pub fn set_device(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.device_id = id.into();
        self.device_name = name.into();
    }

    /// Merge what the remote player reports into local state.
    pub fn apply_remote(&mut self, remote: &RemotePlayback) {
        self.is_playing = remote.is_playing;
        self.progress_ms = remote.progress_ms;
        self.progress_at = Instant::now();
        if remote.duration_ms > 0 {
            self.duration_ms = remote.duration_ms;
        }

        if self.device_id.is_empty() {
            if let Some(id) = &remote.device_id {
                self.set_device(id.clone(), remote.device_name.clone());
            }
        }
        if let Some(percent) = remote.volume_percent {
            self.set_volume(percent as f32 / 100.0);
        }

        if let Some(uri) = &remote.track_uri {
            if let Some(index) = self.track_list.iter().position(|t| &t.uri == uri) {
                self.current_index = index;
                self.first_play = false;
            }
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.track_list.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_volume(&self) -> f32 {
        self.volume
    }

    pub fn volume_percent(&self) -> u8 {
        (self.volume * 100.0).round() as u8
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn track_list(&self) -> &[Track] {
        &self.track_list
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn first_play(&self) -> bool {
        self.first_play
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Progress interpolated from the last remote report
    pub fn progress_ms(&self) -> u32 {
        if self.is_playing && self.duration_ms > 0 {
            let elapsed = u32::try_from(self.progress_at.elapsed().as_millis()).unwrap_or(u32::MAX);
            self.progress_ms.saturating_add(elapsed).min(self.duration_ms)
        } else {
            self.progress_ms
        }
    }
}

/// View toggles that only change on explicit user action
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiToggles {
    pub lyrics_visible: bool,
}

impl UiToggles {
    pub fn toggle_lyrics(&mut self) {
        self.lyrics_visible = !self.lyrics_visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: &str) -> Track {
        Track {
            uri: uri.to_string(),
            title: uri.to_string(),
            ..Default::default()
        }
    }

    fn state_with(uris: &[&str]) -> PlaybackState {
        let mut state = PlaybackState::default();
        state.set_track_list(uris.iter().map(|u| track(u)).collect());
        state
    }

    #[test]
    fn advance_then_retreat_returns_to_start() {
        for len in 1..6 {
            let uris: Vec<String> = (0..len).map(|i| format!("t{}", i)).collect();
            let refs: Vec<&str> = uris.iter().map(String::as_str).collect();
            for start in 0..len {
                let mut state = state_with(&refs);
                state.set_current_index(start);
                state.advance();
                state.retreat();
                assert_eq!(state.current_index(), start);
            }
        }
    }

    #[test]
    fn advance_wraps_to_first_track() {
        let mut state = state_with(&["a", "b", "c"]);
        state.set_current_index(2);
        state.advance();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current_track().map(|t| t.uri.as_str()), Some("a"));

        state.retreat();
        assert_eq!(state.current_index(), 2);
    }

    #[test]
    fn empty_list_ignores_navigation() {
        let mut state = PlaybackState::default();
        state.advance();
        state.retreat();
        state.set_current_index(3);
        assert_eq!(state.current_index(), 0);
        assert!(state.current_track().is_none());
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut state = state_with(&["a", "b"]);
        state.set_current_index(1);
        state.set_current_index(2);
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn new_list_resets_index() {
        let mut state = state_with(&["a", "b", "c"]);
        state.set_current_index(2);
        state.set_track_list(vec![track("x")]);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn volume_is_clamped() {
        let mut state = PlaybackState::default();
        state.set_volume(-0.5);
        assert_eq!(state.current_volume(), 0.0);
        state.set_volume(1.7);
        assert_eq!(state.current_volume(), 1.0);
        state.set_volume(0.3);
        assert!((state.current_volume() - 0.3).abs() < f32::EPSILON);
        state.set_volume(f32::NAN);
        assert_eq!(state.current_volume(), 0.0);
        state.set_volume(f32::INFINITY);
        assert_eq!(state.current_volume(), 1.0);
    }

    #[test]
    fn toggle_playing_twice_is_identity() {
        let mut state = PlaybackState::default();
        let before = state.is_playing();
        state.toggle_playing();
        assert_ne!(state.is_playing(), before);
        state.toggle_playing();
        assert_eq!(state.is_playing(), before);
    }

    #[test]
    fn remote_report_selects_known_track_and_keeps_device() {
        let mut state = state_with(&["a", "b", "c"]);
        state.set_device("dev-1", "desk");

        state.apply_remote(&RemotePlayback {
            track_uri: Some("c".to_string()),
            is_playing: true,
            progress_ms: 1_000,
            duration_ms: 200_000,
            device_id: Some("dev-2".to_string()),
            device_name: "phone".to_string(),
            volume_percent: Some(40),
        });

        assert_eq!(state.current_index(), 2);
        assert!(state.is_playing());
        assert!(!state.first_play());
        assert_eq!(state.device_id(), "dev-1");
        assert_eq!(state.volume_percent(), 40);
    }

    #[test]
    fn remote_report_adopts_device_when_unset() {
        let mut state = PlaybackState::default();
        state.apply_remote(&RemotePlayback {
            device_id: Some("dev-2".to_string()),
            device_name: "phone".to_string(),
            ..Default::default()
        });
        assert_eq!(state.device_id(), "dev-2");
        assert_eq!(state.device_name(), "phone");
        assert!(state.first_play());
    }

    #[test]
    fn toggle_lyrics_flips() {
        let mut toggles = UiToggles::default();
        toggles.toggle_lyrics();
        assert!(toggles.lyrics_visible);
        toggles.toggle_lyrics();
        assert!(!toggles.lyrics_visible);
    }
}
