//! Navigation-related controller methods (library, search, detail views)

use rspotify::model::PlayableItem;

use crate::api::library::{self, CollectionKind};
use crate::api::playlist::PLAYLIST_PAGE_SIZE;
use crate::api::{ApiError, album, artist, movie, playlist, search};
use crate::model::{
    ContentView, Entry, EntryKind, EntryList, Focus, LibrarySection, MoreTracks, Section, SectionBody,
    SectionedView, SelectedItem, Track, TrackList, VideoList,
};

use super::AppController;

const LIBRARY_PAGE_SIZE: u32 = 50;
const ARTIST_ALBUM_LIMIT: u32 = 20;

fn playlist_page_tracks(items: &[rspotify::model::PlaylistItem]) -> Vec<Track> {
    items
        .iter()
        .filter_map(|item| match &item.track {
            Some(PlayableItem::Track(track)) => Some(Track::from_full(track)),
            _ => None,
        })
        .collect()
}

fn next_page(playlist_id: &str, offset: u32, loaded: usize, total: u32) -> Option<MoreTracks> {
    let next_offset = offset.saturating_add(loaded as u32);
    (loaded > 0 && next_offset < total).then(|| MoreTracks {
        playlist_id: playlist_id.to_string(),
        next_offset,
        total,
    })
}

impl AppController {
    async fn fail_loading(&self, action: &'static str, error: &ApiError) {
        self.model.lock().await.set_content_loading(false).await;
        self.report(action, error).await;
    }

    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        self.model.lock().await.set_content_loading(true).await;

        match search::search_all(&self.http, query).await {
            Ok(response) => {
                let tracks: Vec<Track> = response
                    .tracks
                    .map(|page| page.items.iter().map(Track::from_full).collect())
                    .unwrap_or_default();
                let albums: Vec<Entry> = response
                    .albums
                    .map(|page| page.items.iter().filter_map(Entry::from_album).collect())
                    .unwrap_or_default();
                let artists: Vec<Entry> = response
                    .artists
                    .map(|page| page.items.iter().map(Entry::from_artist).collect())
                    .unwrap_or_default();
                let playlists: Vec<Entry> = response
                    .playlists
                    .map(|page| page.items.iter().flatten().map(Entry::from_playlist).collect())
                    .unwrap_or_default();

                tracing::info!(
                    query,
                    tracks = tracks.len(),
                    albums = albums.len(),
                    artists = artists.len(),
                    playlists = playlists.len(),
                    "Search completed successfully"
                );

                let view = SectionedView::for_query(
                    format!("Results for \"{}\"", query),
                    vec![
                        Section::new("Tracks", SectionBody::Tracks(tracks)),
                        Section::new("Albums", SectionBody::Entries(albums)),
                        Section::new("Artists", SectionBody::Entries(artists)),
                        Section::new("Playlists", SectionBody::Entries(playlists)),
                    ],
                    query,
                );

                let model = self.model.lock().await;
                if view.sections.is_empty() {
                    model.set_content_loading(false).await;
                    model.set_status(format!("No results for \"{}\"", query)).await;
                    return;
                }
                model.replace_content(ContentView::Sections(view)).await;
                model.set_focus(Focus::Content).await;
            }
            Err(e) => self.fail_loading("search", &e).await,
        }
    }

    pub async fn open_library_section(&self, section: LibrarySection) {
        tracing::debug!(section = section.label(), "Opening library section");
        self.model.lock().await.set_content_loading(true).await;

        let view = match section {
            LibrarySection::LikedSongs => self.liked_songs().await.map(|tracks| {
                ContentView::Tracks(TrackList::new(section.label(), tracks))
            }),
            LibrarySection::Albums => self
                .saved_entries(EntryKind::Album)
                .await
                .map(|entries| entry_list(section, entries)),
            LibrarySection::Playlists => self
                .saved_entries(EntryKind::Playlist)
                .await
                .map(|entries| entry_list(section, entries)),
            LibrarySection::Artists => self
                .saved_entries(EntryKind::Artist)
                .await
                .map(|entries| entry_list(section, entries)),
            LibrarySection::Videos => movie::videos(&self.http)
                .await
                .map(|videos| ContentView::Videos(VideoList { videos, selected: 0 })),
        };

        match view {
            Ok(view) => {
                let model = self.model.lock().await;
                model.replace_content(view).await;
                model.set_focus(Focus::Content).await;
            }
            Err(e) => self.fail_loading("open_library_section", &e).await,
        }
    }

    /// Liked songs from the library backend, or from Spotify when it is down
    async fn liked_songs(&self) -> Result<Vec<Track>, ApiError> {
        match library::saved_tracks(&self.http).await {
            Ok(body) => Ok(Track::list_from_json(&body)),
            Err(e) => {
                tracing::warn!(error = %e, "Library backend unavailable, using Spotify saved tracks");
                let page = library::spotify_saved_tracks(&self.http, LIBRARY_PAGE_SIZE, 0).await?;
                Ok(page.items.iter().map(|saved| Track::from_full(&saved.track)).collect())
            }
        }
    }

    async fn saved_entries(&self, kind: EntryKind) -> Result<Vec<Entry>, ApiError> {
        let backend = match kind {
            EntryKind::Album => library::saved_collections(&self.http, CollectionKind::Albums).await,
            EntryKind::Playlist => library::saved_collections(&self.http, CollectionKind::Playlists).await,
            EntryKind::Artist => library::followed_artists(&self.http).await,
        };

        match backend {
            Ok(body) => Ok(Entry::list_from_json(&body, kind)),
            Err(e) => {
                tracing::warn!(error = %e, ?kind, "Library backend unavailable, using Spotify library");
                Ok(match kind {
                    EntryKind::Album => library::spotify_saved_albums(&self.http, LIBRARY_PAGE_SIZE, 0)
                        .await?
                        .items
                        .iter()
                        .map(|saved| Entry::from_full_album(&saved.album))
                        .collect(),
                    EntryKind::Playlist => library::spotify_playlists(&self.http, LIBRARY_PAGE_SIZE, 0)
                        .await?
                        .items
                        .iter()
                        .map(Entry::from_playlist)
                        .collect(),
                    EntryKind::Artist => library::spotify_followed_artists(&self.http, LIBRARY_PAGE_SIZE)
                        .await?
                        .artists
                        .items
                        .iter()
                        .map(Entry::from_artist)
                        .collect(),
                })
            }
        }
    }

    pub async fn open_entry(&self, entry: &Entry) {
        match entry.kind {
            EntryKind::Album => self.open_album(&entry.id).await,
            EntryKind::Artist => self.open_artist(&entry.id).await,
            EntryKind::Playlist => self.open_playlist(&entry.id).await,
        }
    }

    pub async fn open_album(&self, album_id: &str) {
        self.model.lock().await.set_content_loading(true).await;

        match album::album_detail(&self.http, album_id).await {
            Ok(detail) => {
                let artwork = detail.images.first().map(|i| i.url.clone()).unwrap_or_default();
                let tracks = detail
                    .tracks
                    .items
                    .iter()
                    .map(|t| Track::from_simplified(t, &detail.name, &artwork))
                    .collect();
                tracing::info!(album = %detail.name, "Opened album");
                self.model
                    .lock()
                    .await
                    .push_content(ContentView::Tracks(TrackList::new(detail.name.clone(), tracks)))
                    .await;
            }
            Err(e) => self.fail_loading("open_album", &e).await,
        }
    }

    pub async fn open_artist(&self, artist_id: &str) {
        self.model.lock().await.set_content_loading(true).await;

        let (profile, top, albums, related) = tokio::join!(
            artist::artist(&self.http, artist_id),
            artist::top_tracks(&self.http, artist_id, &self.settings.market),
            artist::artist_albums(&self.http, artist_id, ARTIST_ALBUM_LIMIT, 0),
            artist::related_artists(&self.http, artist_id),
        );

        // Related artists are optional
        let related: Vec<Entry> = match related {
            Ok(related) => related.artists.iter().map(Entry::from_artist).collect(),
            Err(e) => {
                tracing::debug!(error = %e, "No related artists");
                Vec::new()
            }
        };

        let result = profile.and_then(|profile| Ok((profile, top?, albums?)));
        match result {
            Ok((profile, top, albums)) => {
                let tracks = top.tracks.iter().map(Track::from_full).collect();
                let albums = albums.items.iter().filter_map(Entry::from_album).collect();
                let mut sections = vec![
                    Section::new("Top tracks", SectionBody::Tracks(tracks)),
                    Section::new("Albums", SectionBody::Entries(albums)),
                ];
                if !related.is_empty() {
                    sections.push(Section::new("Related artists", SectionBody::Entries(related)));
                }
                let view = SectionedView {
                    title: profile.name.clone(),
                    sections,
                    active: 0,
                };
                tracing::info!(artist = %profile.name, "Opened artist");
                self.model.lock().await.push_content(ContentView::Sections(view)).await;
            }
            Err(e) => self.fail_loading("open_artist", &e).await,
        }
    }

    pub async fn open_playlist(&self, playlist_id: &str) {
        self.model.lock().await.set_content_loading(true).await;

        let (info, page) = tokio::join!(
            playlist::playlist(&self.http, playlist_id),
            playlist::playlist_tracks(&self.http, playlist_id, PLAYLIST_PAGE_SIZE, 0),
        );

        match info.and_then(|info| Ok((info, page?))) {
            Ok((info, page)) => {
                let tracks = playlist_page_tracks(&page.items);
                let mut list = TrackList::new(info.name.clone(), tracks);
                list.more = next_page(playlist_id, 0, page.items.len(), page.total);
                tracing::info!(playlist = %info.name, total = page.total, "Opened playlist");
                self.model.lock().await.push_content(ContentView::Tracks(list)).await;
            }
            Err(e) => self.fail_loading("open_playlist", &e).await,
        }
    }

    pub async fn load_more_playlist_tracks(&self, more: MoreTracks) {
        tracing::debug!(playlist_id = %more.playlist_id, offset = more.next_offset, "Loading more playlist tracks");

        match playlist::playlist_tracks(&self.http, &more.playlist_id, PLAYLIST_PAGE_SIZE, more.next_offset).await {
            Ok(page) => {
                let tracks = playlist_page_tracks(&page.items);
                let next = next_page(&more.playlist_id, more.next_offset, page.items.len(), page.total);
                tracing::info!(loaded = tracks.len(), has_more = next.is_some(), "Loaded more playlist tracks");
                self.model
                    .lock()
                    .await
                    .append_playlist_tracks(&more.playlist_id, tracks, next)
                    .await;
            }
            Err(e) => self.fail_loading("load_more_playlist_tracks", &e).await,
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Track { tracks, index } => self.play_from_list(tracks, index).await,
            SelectedItem::Entry(entry) => self.open_entry(&entry).await,
            SelectedItem::Video(video) => self.show_video(&video).await,
        }
    }

    /// Videos are not played here; their location goes to the status line
    async fn show_video(&self, video: &movie::Video) {
        match movie::video_info(&self.http, &video.key).await {
            Ok(info) => {
                let location = info
                    .get("url")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .or_else(|| video.url.clone())
                    .unwrap_or_else(|| video.key.clone());
                self.model
                    .lock()
                    .await
                    .set_status(format!("{}: {}", video.display_name(), location))
                    .await;
            }
            Err(e) => self.report("video_info", &e).await,
        }
    }

    /// Load a listing into the store and start the chosen track
    pub async fn play_from_list(&self, tracks: Vec<Track>, index: usize) {
        let target = {
            let model = self.model.lock().await;
            model
                .update_playback(|p| {
                    p.set_track_list(tracks);
                    p.set_current_index(index);
                    let uri = p.current_track().map(|t| t.uri.clone()).unwrap_or_default();
                    (uri, p.device_id().to_string())
                })
                .await
        };

        let (uri, device_id) = target;
        if device_id.is_empty() {
            self.model
                .lock()
                .await
                .set_status("No device selected. Press 'd' to pick one.")
                .await;
            return;
        }
        if uri.is_empty() {
            self.model.lock().await.set_status("This track cannot be played").await;
            return;
        }

        match self.player.play(&uri, &device_id).await {
            Ok(()) => {
                self.model
                    .lock()
                    .await
                    .update_playback(|p| {
                        p.set_playing(true);
                        p.mark_played();
                    })
                    .await;
                tracing::info!(uri = %uri, "Playing selection");
            }
            Err(e) => self.report("play_from_list", &e).await,
        }
    }

    /// Fill the liked set from the library backend
    pub async fn load_liked_library(&self) {
        match library::saved_tracks(&self.http).await {
            Ok(body) => {
                let ids = Track::list_from_json(&body)
                    .into_iter()
                    .map(|t| t.id)
                    .filter(|id| !id.is_empty());
                self.model.lock().await.set_liked(ids).await;
            }
            Err(e) => tracing::warn!(error = %e, "Could not load liked library"),
        }
    }

    pub async fn toggle_liked_track(&self, track: &Track) {
        if track.id.is_empty() {
            tracing::warn!("Cannot toggle liked status: track ID is empty");
            self.model
                .lock()
                .await
                .set_status("Cannot like/unlike: track has no ID")
                .await;
            return;
        }

        let liked = self.model.lock().await.is_liked(&track.id).await;
        let body = track.to_json();
        let result = if liked {
            library::remove_favorite_song(&self.http, &body).await
        } else {
            library::add_favorite_song(&self.http, &body).await
        };

        match result {
            Ok(()) => {
                let model = self.model.lock().await;
                model.mark_liked(&track.id, !liked).await;
                let status = if liked { "removed from" } else { "added to" };
                tracing::info!(track_id = %track.id, status, "Track liked status toggled");
                model.set_status(format!("\"{}\" {} liked songs", track.title, status)).await;
            }
            Err(e) => self.report("toggle_liked_track", &e).await,
        }
    }
}

fn entry_list(section: LibrarySection, entries: Vec<Entry>) -> ContentView {
    ContentView::Entries(EntryList {
        title: section.label().to_string(),
        entries,
        selected: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{harness, track};
    use super::*;

    #[test]
    fn next_page_stops_at_total() {
        assert_eq!(
            next_page("p", 0, 50, 120),
            Some(MoreTracks {
                playlist_id: "p".to_string(),
                next_offset: 50,
                total: 120
            })
        );
        assert_eq!(next_page("p", 100, 20, 120), None);
        assert_eq!(next_page("p", 0, 0, 120), None);
    }

    #[tokio::test]
    async fn selecting_a_track_loads_list_and_plays_it() {
        let h = harness();
        h.load(&[], "dev").await;

        h.controller
            .handle_selected_item(SelectedItem::Track {
                tracks: vec![track("a"), track("b"), track("c")],
                index: 1,
            })
            .await;

        assert_eq!(h.player.calls(), vec!["play b dev"]);
        let state = h.controller.model.lock().await.playback().await;
        assert_eq!(state.track_list().len(), 3);
        assert_eq!(state.current_index(), 1);
        assert!(state.is_playing());
    }

    #[tokio::test]
    async fn selecting_without_device_only_loads_list() {
        let h = harness();

        h.controller.play_from_list(vec![track("a"), track("b")], 1).await;

        assert!(h.player.calls().is_empty());
        let model = h.controller.model.lock().await;
        assert_eq!(model.playback().await.current_index(), 1);
        assert!(model.has_status().await);
    }

    #[tokio::test]
    async fn backend_failure_clears_loading_and_reports() {
        let h = harness();

        h.controller.open_album("missing").await;

        let model = h.controller.model.lock().await;
        assert!(!model.render_state().await.content.is_loading);
        assert!(model.has_status().await);
    }
}
