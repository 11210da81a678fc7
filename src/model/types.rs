//! Core type definitions for the application

use std::time::Instant;

use rspotify::model::{
    Device, FullAlbum, FullArtist, FullTrack, SimplifiedAlbum, SimplifiedArtist, SimplifiedPlaylist, SimplifiedTrack,
};
use rspotify::prelude::Id;
use serde_json::{json, Value};

/// A playable item. Immutable once fetched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub uri: String,
    pub id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub artwork_url: String,
    /// Preview or web URL of the audio, when the service exposes one
    pub source_uri: String,
    pub duration_ms: u32,
}

fn millis(duration: chrono::TimeDelta) -> u32 {
    u32::try_from(duration.num_milliseconds().max(0)).unwrap_or(u32::MAX)
}

fn artist_names(artists: &[SimplifiedArtist]) -> Vec<String> {
    artists.iter().map(|a| a.name.clone()).collect()
}

fn first_image(album: &SimplifiedAlbum) -> String {
    album.images.first().map(|i| i.url.clone()).unwrap_or_default()
}

impl Track {
    pub fn from_full(track: &FullTrack) -> Self {
        let (id, uri) = track
            .id
            .as_ref()
            .map(|id| (id.id().to_string(), id.uri()))
            .unwrap_or_default();

        Self {
            uri,
            id,
            title: track.name.clone(),
            artists: artist_names(&track.artists),
            album: track.album.name.clone(),
            artwork_url: first_image(&track.album),
            source_uri: track
                .preview_url
                .clone()
                .or_else(|| track.external_urls.get("spotify").cloned())
                .unwrap_or_default(),
            duration_ms: millis(track.duration),
        }
    }

    /// Album track listings omit the album, so it is supplied by the caller.
    pub fn from_simplified(track: &SimplifiedTrack, album: &str, artwork_url: &str) -> Self {
        let (id, uri) = track
            .id
            .as_ref()
            .map(|id| (id.id().to_string(), id.uri()))
            .unwrap_or_default();

        Self {
            uri,
            id,
            title: track.name.clone(),
            artists: artist_names(&track.artists),
            album: album.to_string(),
            artwork_url: artwork_url.to_string(),
            source_uri: track
                .preview_url
                .clone()
                .or_else(|| track.external_urls.get("spotify").cloned())
                .unwrap_or_default(),
            duration_ms: millis(track.duration),
        }
    }

    /// Read a track stored by the library backend. Entries are Spotify-shaped
    /// objects, optionally wrapped as `{ "track": { ... } }`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let value = value.get("track").filter(|t| t.is_object()).unwrap_or(value);
        let str_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        let id = str_field("id").unwrap_or_default();
        let uri = str_field("uri").unwrap_or_else(|| {
            if id.is_empty() {
                String::new()
            } else {
                format!("spotify:track:{}", id)
            }
        });
        let title = str_field("name").or_else(|| str_field("title"))?;

        let artists = value
            .get("artists")
            .or_else(|| value.get("artist"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|a| a.as_str().or_else(|| a.get("name").and_then(Value::as_str)))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let album = value.get("album");
        let artwork_url = album
            .and_then(|a| a.get("images"))
            .and_then(|images| images.get(0))
            .and_then(|image| image.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| str_field("imgPic"))
            .unwrap_or_default();

        Some(Self {
            uri,
            id,
            title,
            artists,
            album: album
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            artwork_url,
            source_uri: str_field("preview_url").or_else(|| str_field("song")).unwrap_or_default(),
            duration_ms: value
                .get("duration_ms")
                .and_then(Value::as_u64)
                .and_then(|ms| u32::try_from(ms).ok())
                .unwrap_or(0),
        })
    }

    /// Parse a library backend listing: a bare array or `{ "items": [...] }`.
    pub fn list_from_json(value: &Value) -> Vec<Self> {
        json_items(value).iter().filter_map(Self::from_json).collect()
    }

    /// The shape posted to the library backend; `from_json` reads it back.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "uri": self.uri,
            "name": self.title,
            "artists": self.artists.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
            "album": {
                "name": self.album,
                "images": if self.artwork_url.is_empty() { vec![] } else { vec![json!({ "url": self.artwork_url })] },
            },
            "preview_url": self.source_uri,
            "duration_ms": self.duration_ms,
        })
    }

    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

fn json_items(value: &Value) -> &[Value] {
    value
        .as_array()
        .or_else(|| value.get("items").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Album,
    Artist,
    Playlist,
}

/// A browsable album, artist or playlist
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub subtitle: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn from_album(album: &SimplifiedAlbum) -> Option<Self> {
        let id = album.id.as_ref()?.id().to_string();
        let year = album
            .release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .unwrap_or_default();
        let artists = artist_names(&album.artists).join(", ");
        Some(Self {
            id,
            name: album.name.clone(),
            subtitle: if year.is_empty() { artists } else { format!("{} ({})", artists, year) },
            kind: EntryKind::Album,
        })
    }

    pub fn from_full_album(album: &FullAlbum) -> Self {
        let year = album.release_date.split('-').next().unwrap_or_default();
        let artists = artist_names(&album.artists).join(", ");
        Self {
            id: album.id.id().to_string(),
            name: album.name.clone(),
            subtitle: if year.is_empty() { artists } else { format!("{} ({})", artists, year) },
            kind: EntryKind::Album,
        }
    }

    pub fn from_artist(artist: &FullArtist) -> Self {
        Self {
            id: artist.id.id().to_string(),
            name: artist.name.clone(),
            subtitle: artist.genres.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
            kind: EntryKind::Artist,
        }
    }

    pub fn from_playlist(playlist: &SimplifiedPlaylist) -> Self {
        Self {
            id: playlist.id.id().to_string(),
            name: playlist.name.clone(),
            subtitle: playlist.owner.display_name.clone().unwrap_or_default(),
            kind: EntryKind::Playlist,
        }
    }

    /// Read an album, playlist or artist stored by the library backend.
    pub fn from_json(value: &Value, kind: EntryKind) -> Option<Self> {
        let id = value.get("id").and_then(Value::as_str)?.to_string();
        let name = value.get("name").and_then(Value::as_str)?.to_string();
        let subtitle = match kind {
            EntryKind::Playlist => value
                .get("owner")
                .and_then(|o| o.get("display_name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            EntryKind::Album => value
                .get("artists")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(|a| a.get("name").and_then(Value::as_str))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default(),
            EntryKind::Artist => String::new(),
        };
        Some(Self { id, name, subtitle, kind })
    }

    pub fn list_from_json(value: &Value, kind: EntryKind) -> Vec<Self> {
        json_items(value)
            .iter()
            .filter_map(|item| Self::from_json(item, kind))
            .collect()
    }
}

/// Information about a Spotify playback device
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

impl DeviceInfo {
    pub fn from_device(device: &Device) -> Option<Self> {
        Some(Self {
            id: device.id.clone()?,
            name: device.name.clone(),
            is_active: device.is_active,
        })
    }
}

/// Which area of the screen receives non-shortcut keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Search,
    Library,
    Content,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Library,
            Focus::Library => Focus::Content,
            Focus::Content => Focus::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Content,
            Focus::Library => Focus::Search,
            Focus::Content => Focus::Library,
        }
    }

    /// Keys typed here are text, never shortcuts
    pub fn is_text_entry(self) -> bool {
        matches!(self, Focus::Search)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibrarySection {
    LikedSongs,
    Albums,
    Playlists,
    Artists,
    Videos,
}

impl LibrarySection {
    pub const ALL: [LibrarySection; 5] = [
        LibrarySection::LikedSongs,
        LibrarySection::Albums,
        LibrarySection::Playlists,
        LibrarySection::Artists,
        LibrarySection::Videos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LibrarySection::LikedSongs => "Liked songs",
            LibrarySection::Albums => "Saved albums",
            LibrarySection::Playlists => "Playlists",
            LibrarySection::Artists => "Followed artists",
            LibrarySection::Videos => "Videos",
        }
    }
}

#[derive(Clone, Debug)]
pub struct DevicePicker {
    pub devices: Vec<DeviceInfo>,
    pub selected: usize,
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub focus: Focus,
    pub search_query: String,
    pub library_selected: usize,
    pub status_message: Option<String>,
    pub status_timestamp: Option<Instant>,
    pub device_picker: Option<DevicePicker>,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Library,
            search_query: String::new(),
            library_selected: 0,
            status_message: None,
            status_timestamp: None,
            device_picker: None,
            show_help: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_track_json_round_trips_through_to_json() {
        let track = Track {
            uri: "spotify:track:1".to_string(),
            id: "1".to_string(),
            title: "Song".to_string(),
            artists: vec!["A".to_string(), "B".to_string()],
            album: "Record".to_string(),
            artwork_url: "https://img/1".to_string(),
            source_uri: "https://preview/1".to_string(),
            duration_ms: 180_000,
        };
        assert_eq!(Track::from_json(&track.to_json()), Some(track));
    }

    #[test]
    fn library_listing_accepts_wrapped_items() {
        let body = json!({
            "items": [
                { "track": { "id": "7", "name": "Wrapped", "artists": [{ "name": "X" }] } },
                { "title": "Legacy", "artist": ["Y", "Z"], "imgPic": "https://img", "song": "/music/a.mp3" },
                { "no": "title" }
            ]
        });
        let tracks = Track::list_from_json(&body);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].uri, "spotify:track:7");
        assert_eq!(tracks[1].artists, vec!["Y", "Z"]);
        assert_eq!(tracks[1].artwork_url, "https://img");
        assert_eq!(tracks[1].source_uri, "/music/a.mp3");
        assert!(tracks[1].uri.is_empty());
    }

    #[test]
    fn entries_from_library_json() {
        let body = json!([
            { "id": "p1", "name": "Mix", "owner": { "display_name": "me" } },
            { "name": "missing id" }
        ]);
        let entries = Entry::list_from_json(&body, EntryKind::Playlist);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subtitle, "me");
    }

    #[test]
    fn only_search_focus_is_text_entry() {
        assert!(Focus::Search.is_text_entry());
        assert!(!Focus::Library.is_text_entry());
        assert!(!Focus::Content.is_text_entry());
        assert_eq!(Focus::Search.next().prev(), Focus::Search);
    }
}
