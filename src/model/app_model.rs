//! Main application model with state management

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};

use super::content::{ContentState, ContentView, MoreTracks, SelectedItem};
use super::playback::{PlaybackState, UiToggles};
use super::types::{DeviceInfo, DevicePicker, Focus, LibrarySection, Track, UiState};

const STATUS_TTL_SECS: u64 = 5;

/// Lyrics for the track they were fetched for
#[derive(Clone, Debug, Default)]
pub struct LyricsState {
    pub track_uri: String,
    pub text: Option<String>,
    pub is_loading: bool,
}

/// Everything the view needs for one frame
#[derive(Clone, Debug)]
pub struct RenderState {
    pub playback: PlaybackState,
    pub toggles: UiToggles,
    pub ui: UiState,
    pub content: ContentState,
    pub lyrics: LyricsState,
    pub liked: HashSet<String>,
}

/// Main application model containing all state
pub struct AppModel {
    playback: Arc<Mutex<PlaybackState>>,
    toggles: Arc<Mutex<UiToggles>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    lyrics: Arc<Mutex<LyricsState>>,
    liked: Arc<RwLock<HashSet<String>>>,
    should_quit: Arc<Mutex<bool>>,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            playback: Arc::new(Mutex::new(PlaybackState::default())),
            toggles: Arc::new(Mutex::new(UiToggles::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            lyrics: Arc::new(Mutex::new(LyricsState::default())),
            liked: Arc::new(RwLock::new(HashSet::new())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn render_state(&self) -> RenderState {
        RenderState {
            playback: self.playback.lock().await.clone(),
            toggles: *self.toggles.lock().await,
            ui: self.ui_state.lock().await.clone(),
            content: self.content_state.lock().await.clone(),
            lyrics: self.lyrics.lock().await.clone(),
            liked: self.liked.read().await.clone(),
        }
    }

    // ========================================================================
    // Playback store
    // ========================================================================

    pub async fn playback(&self) -> PlaybackState {
        self.playback.lock().await.clone()
    }

    /// Run one or more store actions under a single lock
    pub async fn update_playback<R>(&self, action: impl FnOnce(&mut PlaybackState) -> R) -> R {
        let mut playback = self.playback.lock().await;
        action(&mut playback)
    }

    pub async fn toggles(&self) -> UiToggles {
        *self.toggles.lock().await
    }

    /// Returns whether lyrics are now visible
    pub async fn toggle_lyrics(&self) -> bool {
        let mut toggles = self.toggles.lock().await;
        toggles.toggle_lyrics();
        toggles.lyrics_visible
    }

    // ========================================================================
    // Focus, search box and sidebar
    // ========================================================================

    pub async fn focus(&self) -> Focus {
        self.ui_state.lock().await.focus
    }

    pub async fn set_focus(&self, focus: Focus) {
        self.ui_state.lock().await.focus = focus;
    }

    pub async fn cycle_focus(&self, forward: bool) {
        let mut state = self.ui_state.lock().await;
        state.focus = if forward { state.focus.next() } else { state.focus.prev() };
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    pub async fn search_query(&self) -> String {
        self.ui_state.lock().await.search_query.clone()
    }

    pub async fn move_library_selection(&self, down: bool) {
        let mut state = self.ui_state.lock().await;
        let last = LibrarySection::ALL.len() - 1;
        if down {
            state.library_selected = (state.library_selected + 1).min(last);
        } else {
            state.library_selected = state.library_selected.saturating_sub(1);
        }
    }

    pub async fn selected_library_section(&self) -> LibrarySection {
        let index = self.ui_state.lock().await.library_selected;
        LibrarySection::ALL[index.min(LibrarySection::ALL.len() - 1)]
    }

    // ========================================================================
    // Status line
    // ========================================================================

    pub async fn set_status(&self, message: impl Into<String>) {
        let mut state = self.ui_state.lock().await;
        state.status_message = Some(message.into());
        state.status_timestamp = Some(Instant::now());
    }

    pub async fn clear_status(&self) {
        let mut state = self.ui_state.lock().await;
        state.status_message = None;
        state.status_timestamp = None;
    }

    pub async fn has_status(&self) -> bool {
        self.ui_state.lock().await.status_message.is_some()
    }

    pub async fn auto_clear_old_status(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.status_timestamp {
            if timestamp.elapsed().as_secs() >= STATUS_TTL_SECS {
                state.status_message = None;
                state.status_timestamp = None;
            }
        }
    }

    // ========================================================================
    // Device picker and help
    // ========================================================================

    pub async fn show_device_picker(&self, devices: Vec<DeviceInfo>) {
        let mut state = self.ui_state.lock().await;
        let selected = devices.iter().position(|d| d.is_active).unwrap_or(0);
        state.device_picker = Some(DevicePicker { devices, selected });
    }

    pub async fn hide_device_picker(&self) {
        self.ui_state.lock().await.device_picker = None;
    }

    pub async fn is_device_picker_open(&self) -> bool {
        self.ui_state.lock().await.device_picker.is_some()
    }

    pub async fn device_picker_move(&self, down: bool) {
        let mut state = self.ui_state.lock().await;
        if let Some(picker) = state.device_picker.as_mut() {
            if down {
                if picker.selected < picker.devices.len().saturating_sub(1) {
                    picker.selected += 1;
                }
            } else {
                picker.selected = picker.selected.saturating_sub(1);
            }
        }
    }

    pub async fn selected_device(&self) -> Option<DeviceInfo> {
        let state = self.ui_state.lock().await;
        let picker = state.device_picker.as_ref()?;
        picker.devices.get(picker.selected).cloned()
    }

    pub async fn set_help_visible(&self, visible: bool) {
        self.ui_state.lock().await.show_help = visible;
    }

    pub async fn is_help_visible(&self) -> bool {
        self.ui_state.lock().await.show_help
    }

    // ========================================================================
    // Content area
    // ========================================================================

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    pub async fn replace_content(&self, view: ContentView) {
        self.content_state.lock().await.replace(view);
    }

    pub async fn push_content(&self, view: ContentView) {
        self.content_state.lock().await.push(view);
    }

    pub async fn navigate_back(&self) -> bool {
        self.content_state.lock().await.back()
    }

    pub async fn content_move(&self, down: bool) {
        self.content_state.lock().await.view.move_selection(down);
    }

    pub async fn content_cycle_section(&self, forward: bool) {
        self.content_state.lock().await.view.cycle_section(forward);
    }

    pub async fn selected_content_item(&self) -> Option<SelectedItem> {
        self.content_state.lock().await.view.selected_item()
    }

    /// The playlist page to fetch next, if the cursor reached the end of one.
    /// Marks the content as loading so the page is requested only once.
    pub async fn take_more_request(&self) -> Option<MoreTracks> {
        let mut state = self.content_state.lock().await;
        if state.is_loading {
            return None;
        }
        let more = state.view.wants_more()?;
        state.is_loading = true;
        Some(more)
    }

    pub async fn append_playlist_tracks(&self, playlist_id: &str, tracks: Vec<Track>, more: Option<MoreTracks>) {
        self.content_state.lock().await.append_tracks(playlist_id, tracks, more);
    }

    // ========================================================================
    // Liked library
    // ========================================================================

    pub async fn set_liked(&self, ids: impl IntoIterator<Item = String>) {
        let mut liked = self.liked.write().await;
        liked.clear();
        liked.extend(ids);
        tracing::debug!(count = liked.len(), "Liked library loaded");
    }

    pub async fn is_liked(&self, id: &str) -> bool {
        self.liked.read().await.contains(id)
    }

    pub async fn mark_liked(&self, id: &str, liked: bool) {
        let mut set = self.liked.write().await;
        if liked {
            set.insert(id.to_string());
        } else {
            set.remove(id);
        }
    }

    // ========================================================================
    // Lyrics
    // ========================================================================

    /// Start a lyrics fetch for `track_uri`. Returns false when lyrics for it
    /// are already present or in flight.
    pub async fn begin_lyrics(&self, track_uri: &str) -> bool {
        let mut lyrics = self.lyrics.lock().await;
        if lyrics.track_uri == track_uri && (lyrics.is_loading || lyrics.text.is_some()) {
            return false;
        }
        *lyrics = LyricsState {
            track_uri: track_uri.to_string(),
            text: None,
            is_loading: true,
        };
        true
    }

    /// Store fetched lyrics unless the user moved on to another track meanwhile
    pub async fn finish_lyrics(&self, track_uri: &str, text: Option<String>) {
        let mut lyrics = self.lyrics.lock().await;
        if lyrics.track_uri == track_uri {
            lyrics.text = text;
            lyrics.is_loading = false;
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::content::TrackList;

    #[tokio::test]
    async fn status_is_set_and_cleared() {
        let model = AppModel::new();
        model.set_status("No active device").await;
        assert!(model.has_status().await);

        model.auto_clear_old_status().await;
        assert!(model.has_status().await);

        model.clear_status().await;
        assert!(!model.has_status().await);
    }

    #[tokio::test]
    async fn device_picker_starts_on_active_device() {
        let model = AppModel::new();
        let device = |id: &str, active| DeviceInfo {
            id: id.to_string(),
            name: id.to_string(),
            is_active: active,
        };
        model
            .show_device_picker(vec![device("a", false), device("b", true), device("c", false)])
            .await;
        assert_eq!(model.selected_device().await.map(|d| d.id), Some("b".to_string()));

        model.device_picker_move(true).await;
        model.device_picker_move(true).await;
        assert_eq!(model.selected_device().await.map(|d| d.id), Some("c".to_string()));

        model.hide_device_picker().await;
        assert!(model.selected_device().await.is_none());
    }

    #[tokio::test]
    async fn more_request_is_taken_once() {
        let model = AppModel::new();
        let mut list = TrackList::new("p", vec![Track::default()]);
        list.more = Some(MoreTracks {
            playlist_id: "p1".to_string(),
            next_offset: 1,
            total: 10,
        });
        model.replace_content(ContentView::Tracks(list)).await;

        assert!(model.take_more_request().await.is_some());
        assert!(model.take_more_request().await.is_none());

        model.append_playlist_tracks("p1", vec![Track::default()], None).await;
        assert!(model.take_more_request().await.is_none());
    }

    #[tokio::test]
    async fn stale_lyrics_are_dropped() {
        let model = AppModel::new();
        assert!(model.begin_lyrics("a").await);
        assert!(!model.begin_lyrics("a").await);
        assert!(model.begin_lyrics("b").await);

        model.finish_lyrics("a", Some("old".to_string())).await;
        assert!(model.render_state().await.lyrics.text.is_none());

        model.finish_lyrics("b", Some("new".to_string())).await;
        assert_eq!(model.render_state().await.lyrics.text.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn library_selection_is_bounded() {
        let model = AppModel::new();
        model.move_library_selection(false).await;
        assert_eq!(model.selected_library_section().await, LibrarySection::LikedSongs);
        for _ in 0..10 {
            model.move_library_selection(true).await;
        }
        assert_eq!(model.selected_library_section().await, LibrarySection::Videos);
    }
}
