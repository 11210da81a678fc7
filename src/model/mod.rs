//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (tracks, entries, focus, UI state)
//! - `playback`: The playback state store and UI toggles
//! - `content`: Content view data (listings, search results, detail pages)
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod content;
mod app_model;

pub use types::{DeviceInfo, DevicePicker, Entry, EntryKind, Focus, LibrarySection, Track, UiState};

pub use playback::{PlaybackState, RemotePlayback, UiToggles};

pub use content::{
    ContentState, ContentView, EntryList, MoreTracks, Section, SectionBody, SectionedView, SelectedItem,
    TrackList, VideoList,
};

pub use app_model::{AppModel, LyricsState, RenderState};
