//! Main content area rendering (track lists, entries, search sections, videos)

use std::collections::HashSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph, Tabs},
    Frame,
};

use crate::api::movie::Video;
use crate::model::{ContentState, ContentView, Entry, EntryKind, Focus, SectionBody, SectionedView, Track, UiState};

use super::utils::{
    calculate_num_width, calculate_track_column_widths, format_duration, render_scrollable_list, truncate_string,
    Palette,
};

/// What a track row needs to know beyond the track itself
pub struct RowContext<'a> {
    pub liked: &'a HashSet<String>,
    pub playing_uri: Option<&'a str>,
    pub focused: bool,
    pub palette: &'a Palette,
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    rows: &RowContext,
) {
    let palette = rows.palette;
    let border_style = palette.border(ui_state.focus == Focus::Content);

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(palette.info))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new(
                "Pick a library section on the left or press / to search\n\n\
                 Space play/pause, ←/→ previous/next, ↑/↓ volume, L lyrics\n\
                 Press ? for all keys",
            )
            .style(Style::default().fg(palette.dim))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
            frame.render_widget(content, area);
        }
        ContentView::Tracks(list) => {
            let block = titled_block(&list.title, list.tracks.len(), border_style);
            render_track_list(frame, area, &list.tracks, list.selected, block, rows);
        }
        ContentView::Entries(list) => {
            let block = titled_block(&list.title, list.entries.len(), border_style);
            render_entry_list(frame, area, &list.entries, list.selected, block, rows);
        }
        ContentView::Videos(list) => {
            let block = titled_block("Videos", list.videos.len(), border_style);
            render_video_list(frame, area, &list.videos, list.selected, block, rows);
        }
        ContentView::Sections(view) => render_sections(frame, area, view, border_style, rows),
    }
}

fn titled_block(title: &str, count: usize, border_style: Style) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", title, count))
        .border_style(border_style)
}

fn render_sections(frame: &mut Frame, area: Rect, view: &SectionedView, border_style: Style, rows: &RowContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let titles: Vec<Line> = view
        .sections
        .iter()
        .map(|s| Line::from(format!("{} ({})", s.label, s.body.len())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(view.active)
        .style(Style::default().fg(rows.palette.dim))
        .highlight_style(Style::default().fg(rows.palette.accent).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} (< >) ", view.title))
                .border_style(border_style),
        );
    frame.render_widget(tabs, chunks[0]);

    let Some(section) = view.sections.get(view.active) else {
        let empty = Paragraph::new("No results")
            .style(Style::default().fg(rows.palette.dim))
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(empty, chunks[1]);
        return;
    };

    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    match &section.body {
        SectionBody::Tracks(tracks) => render_track_list(frame, chunks[1], tracks, section.selected, block, rows),
        SectionBody::Entries(entries) => render_entry_list(frame, chunks[1], entries, section.selected, block, rows),
    }
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    tracks: &[Track],
    selected_index: usize,
    block: Block,
    rows: &RowContext,
) {
    let content_width = area.width.saturating_sub(2) as usize;
    let (num_width, _, title_width, artist_width, _) = calculate_track_column_widths(content_width, tracks.len());

    let items: Vec<ListItem> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let is_playing = rows.playing_uri.is_some_and(|uri| !uri.is_empty() && uri == track.uri);
            let liked = if rows.liked.contains(&track.id) { "♥ " } else { "  " };
            let prefix = if is_playing { "▶" } else { " " };

            let style = if is_playing && i != selected_index {
                Style::default().fg(rows.palette.info)
            } else {
                rows.palette.row(i == selected_index, rows.focused)
            };

            let line = Line::from(vec![
                Span::raw(format!("{}{:>width$}   ", prefix, i + 1, width = num_width)),
                Span::styled(liked, Style::default().fg(rows.palette.warning)),
                Span::raw("   "),
                Span::raw(truncate_string(&track.title, title_width)),
                Span::raw("   "),
                Span::raw(truncate_string(&track.artist_line(), artist_width)),
                Span::raw(format!("   {:>5}", format_duration(track.duration_ms))),
            ]);
            ListItem::new(line).style(style)
        })
        .collect();

    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_entry_list(
    frame: &mut Frame,
    area: Rect,
    entries: &[Entry],
    selected_index: usize,
    block: Block,
    rows: &RowContext,
) {
    let content_width = area.width.saturating_sub(2) as usize;
    let num_width = calculate_num_width(entries.len());
    let remaining = content_width.saturating_sub(num_width + 10);
    let name_width = remaining / 2;
    let subtitle_width = remaining.saturating_sub(name_width);

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let icon = match entry.kind {
                EntryKind::Album => "💿",
                EntryKind::Artist => "🎤",
                EntryKind::Playlist => "📃",
            };
            let text = format!(
                " {:>width$}  {} {}   {}",
                i + 1,
                icon,
                truncate_string(&entry.name, name_width),
                truncate_string(&entry.subtitle, subtitle_width),
                width = num_width
            );
            ListItem::new(text).style(rows.palette.row(i == selected_index, rows.focused))
        })
        .collect();

    render_scrollable_list(frame, area, items, selected_index, block);
}

fn render_video_list(
    frame: &mut Frame,
    area: Rect,
    videos: &[Video],
    selected_index: usize,
    block: Block,
    rows: &RowContext,
) {
    let num_width = calculate_num_width(videos.len());
    let items: Vec<ListItem> = videos
        .iter()
        .enumerate()
        .map(|(i, video)| {
            let size = video
                .bytes
                .map(|b| format!("   {:.1} MB", b as f64 / 1_048_576.0))
                .unwrap_or_default();
            let text = format!(" {:>width$}  🎬 {}{}", i + 1, video.display_name(), size, width = num_width);
            ListItem::new(text).style(rows.palette.row(i == selected_index, rows.focused))
        })
        .collect();

    render_scrollable_list(frame, area, items, selected_index, block);
}
