//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{Focus, LibrarySection, UiState};
use crate::theme::ThemeMode;

use super::utils::{render_scrollable_list, Palette};

pub fn render_top_bar(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    device_name: &str,
    theme: ThemeMode,
    palette: &Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(28), // Device name
            Constraint::Length(12), // Theme mode
        ])
        .split(area);

    let focused = ui_state.focus == Focus::Search;
    let search_text = if ui_state.search_query.is_empty() && !focused {
        "Press / to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(if focused { palette.border(true) } else { palette.base() })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(palette.border(focused)),
        );
    frame.render_widget(search, chunks[0]);

    if focused {
        let cursor_x = chunks[0].x + 2 + ui_state.search_query.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(chunks[0].right().saturating_sub(2)), chunks[0].y + 1));
    }

    let device_label = if device_name.is_empty() { "No device" } else { device_name };
    let device = Paragraph::new(format!("🎵 {}", device_label))
        .style(ratatui::style::Style::default().fg(palette.info))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Device ")
                .border_style(palette.border(false)),
        );
    frame.render_widget(device, chunks[1]);

    let theme = Paragraph::new(format!(" {}", theme)).style(palette.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Theme ")
            .border_style(palette.border(false)),
    );
    frame.render_widget(theme, chunks[2]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState, palette: &Palette) {
    let focused = ui_state.focus == Focus::Library;

    let items: Vec<ListItem> = LibrarySection::ALL
        .iter()
        .enumerate()
        .map(|(i, section)| {
            ListItem::new(section.label()).style(palette.row(i == ui_state.library_selected, focused))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Library ")
        .padding(Padding::horizontal(1))
        .border_style(palette.border(focused));

    render_scrollable_list(frame, area, items, ui_state.library_selected, block);
}
