//! Content view state for library listings, search results and detail pages

use crate::api::movie::Video;

use super::types::{Entry, Track};

/// Next page of a playlist that is loaded on demand
#[derive(Clone, Debug, PartialEq)]
pub struct MoreTracks {
    pub playlist_id: String,
    pub next_offset: u32,
    pub total: u32,
}

#[derive(Clone, Debug)]
pub struct TrackList {
    pub title: String,
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub more: Option<MoreTracks>,
}

impl TrackList {
    pub fn new(title: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            title: title.into(),
            tracks,
            selected: 0,
            more: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EntryList {
    pub title: String,
    pub entries: Vec<Entry>,
    pub selected: usize,
}

#[derive(Clone, Debug)]
pub enum SectionBody {
    Tracks(Vec<Track>),
    Entries(Vec<Entry>),
}

impl SectionBody {
    pub fn len(&self) -> usize {
        match self {
            SectionBody::Tracks(tracks) => tracks.len(),
            SectionBody::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct Section {
    pub label: &'static str,
    pub body: SectionBody,
    pub selected: usize,
}

impl Section {
    pub fn new(label: &'static str, body: SectionBody) -> Self {
        Self { label, body, selected: 0 }
    }
}

/// Search results and artist pages: several lists, one active at a time
#[derive(Clone, Debug)]
pub struct SectionedView {
    pub title: String,
    pub sections: Vec<Section>,
    pub active: usize,
}

impl SectionedView {
    /// Drops empty sections and opens on the one whose first result best
    /// matches `query`. An exact name match beats a prefix match, which
    /// beats a substring match; ties go to the earlier section.
    pub fn for_query(title: impl Into<String>, sections: Vec<Section>, query: &str) -> Self {
        let sections: Vec<Section> = sections.into_iter().filter(|s| !s.body.is_empty()).collect();
        let query = query.to_lowercase();

        let score = |name: &str| {
            let name = name.to_lowercase();
            if name == query {
                3
            } else if name.starts_with(&query) {
                2
            } else if name.contains(&query) {
                1
            } else {
                0
            }
        };

        let mut active = 0;
        let mut best = 0;
        for (i, section) in sections.iter().enumerate() {
            let first = match &section.body {
                SectionBody::Tracks(tracks) => tracks.first().map(|t| score(&t.title)),
                SectionBody::Entries(entries) => entries.first().map(|e| score(&e.name)),
            };
            if let Some(s) = first {
                if s > best {
                    best = s;
                    active = i;
                }
            }
        }

        Self {
            title: title.into(),
            sections,
            active,
        }
    }
}

#[derive(Clone, Debug)]
pub struct VideoList {
    pub videos: Vec<Video>,
    pub selected: usize,
}

/// What the main content area currently shows
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    Tracks(TrackList),
    Entries(EntryList),
    Sections(SectionedView),
    Videos(VideoList),
}

/// The item under the cursor in the content area
#[derive(Clone, Debug, PartialEq)]
pub enum SelectedItem {
    /// A track plus the list it sits in, so playback can continue through it
    Track { tracks: Vec<Track>, index: usize },
    Entry(Entry),
    Video(Video),
}

fn step(selected: &mut usize, len: usize, down: bool) {
    if down {
        if *selected < len.saturating_sub(1) {
            *selected += 1;
        }
    } else if *selected > 0 {
        *selected -= 1;
    }
}

impl ContentView {
    pub fn move_selection(&mut self, down: bool) {
        match self {
            ContentView::Empty => {}
            ContentView::Tracks(list) => step(&mut list.selected, list.tracks.len(), down),
            ContentView::Entries(list) => step(&mut list.selected, list.entries.len(), down),
            ContentView::Videos(list) => step(&mut list.selected, list.videos.len(), down),
            ContentView::Sections(view) => {
                if let Some(section) = view.sections.get_mut(view.active) {
                    step(&mut section.selected, section.body.len(), down);
                }
            }
        }
    }

    pub fn cycle_section(&mut self, forward: bool) {
        if let ContentView::Sections(view) = self {
            let len = view.sections.len();
            if len > 0 {
                view.active = if forward { (view.active + 1) % len } else { (view.active + len - 1) % len };
            }
        }
    }

    pub fn selected_item(&self) -> Option<SelectedItem> {
        match self {
            ContentView::Empty => None,
            ContentView::Tracks(list) => list.tracks.get(list.selected).map(|_| SelectedItem::Track {
                tracks: list.tracks.clone(),
                index: list.selected,
            }),
            ContentView::Entries(list) => list.entries.get(list.selected).cloned().map(SelectedItem::Entry),
            ContentView::Videos(list) => list.videos.get(list.selected).cloned().map(SelectedItem::Video),
            ContentView::Sections(view) => {
                let section = view.sections.get(view.active)?;
                match &section.body {
                    SectionBody::Tracks(tracks) => tracks.get(section.selected).map(|_| SelectedItem::Track {
                        tracks: tracks.clone(),
                        index: section.selected,
                    }),
                    SectionBody::Entries(entries) => entries.get(section.selected).cloned().map(SelectedItem::Entry),
                }
            }
        }
    }

    /// Whether the cursor sits on the last loaded row of a list that has more pages
    pub fn wants_more(&self) -> Option<MoreTracks> {
        match self {
            ContentView::Tracks(list) if list.selected + 1 >= list.tracks.len() => list.more.clone(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub history: Vec<ContentView>,
    pub is_loading: bool,
}

impl ContentState {
    /// Show a new top-level view, forgetting history
    pub fn replace(&mut self, view: ContentView) {
        self.history.clear();
        self.view = view;
        self.is_loading = false;
    }

    /// Show a detail view on top of the current one
    pub fn push(&mut self, view: ContentView) {
        let previous = std::mem::replace(&mut self.view, view);
        if !matches!(previous, ContentView::Empty) {
            self.history.push(previous);
        }
        self.is_loading = false;
    }

    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.view = previous;
                true
            }
            None => false,
        }
    }

    pub fn append_tracks(&mut self, playlist_id: &str, tracks: Vec<Track>, more: Option<MoreTracks>) {
        if let ContentView::Tracks(list) = &mut self.view {
            if list.more.as_ref().is_some_and(|m| m.playlist_id == playlist_id) {
                list.tracks.extend(tracks);
                list.more = more;
            }
        }
        self.is_loading = false;
    }
}
