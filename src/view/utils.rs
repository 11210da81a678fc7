//! Utility functions for rendering UI components

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

use crate::theme::Appearance;

/// Colors for one appearance
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub info: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                dim: Color::DarkGray,
                accent: Color::Green,
                info: Color::Cyan,
                warning: Color::Red,
            },
            Appearance::Light => Self {
                background: Color::White,
                text: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                info: Color::Magenta,
                warning: Color::Red,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.dim)
        }
    }

    /// Row style; the selected row is bold, and accented when its list has focus
    pub fn row(&self, selected: bool, focused: bool) -> Style {
        match (selected, focused) {
            (true, true) => Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(self.text).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(self.text),
        }
    }
}

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn format_duration(ms: u32) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Width of the index column: digits of the largest index plus padding
pub fn calculate_num_width(item_count: usize) -> usize {
    item_count.max(1).to_string().len() + 1
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Column widths for track listings: (num, liked, title, artist, duration)
pub fn calculate_track_column_widths(content_width: usize, item_count: usize) -> (usize, usize, usize, usize, usize) {
    // " {num}   {liked}   {title}   {artist}   {duration}"
    let num_width = calculate_num_width(item_count);
    let liked_width = 2;
    let duration_width = 6;
    let fixed_width = 1 + num_width + 3 + liked_width + 3 + 3 + 3 + duration_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    (num_width, liked_width, title_width, artist_width, duration_width)
}
