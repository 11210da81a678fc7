//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (palette, formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (status, device picker, help, lyrics)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame,
};

use crate::model::RenderState;
use crate::theme::{Appearance, ThemeMode};

pub use utils::Palette;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, state: &RenderState, theme: ThemeMode, appearance: Appearance) {
        let palette = Palette::for_appearance(appearance);
        frame.render_widget(Block::default().style(palette.base()), frame.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + device + theme
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], &state.ui, state.playback.device_name(), theme, &palette);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25), // Library sections
                Constraint::Percentage(75), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], &state.ui, &palette);

        let rows = content::RowContext {
            liked: &state.liked,
            playing_uri: state.playback.current_track().map(|t| t.uri.as_str()),
            focused: state.ui.focus == crate::model::Focus::Content,
            palette: &palette,
        };
        content::render_main_content(frame, main_chunks[1], &state.ui, &state.content, &rows);

        progress::render_progress_bar(frame, chunks[2], &state.playback, &palette);

        if state.toggles.lyrics_visible {
            overlays::render_lyrics(frame, state.playback.current_track(), &state.lyrics, &palette);
        }

        if let Some(picker) = &state.ui.device_picker {
            overlays::render_device_picker(frame, picker, &palette);
        }

        if state.ui.show_help {
            overlays::render_help_popup(frame, &palette);
        }

        if let Some(message) = &state.ui.status_message {
            overlays::render_status_notification(frame, message, &palette);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::model::{AppModel, Track};

    fn rendered_text(state: &RenderState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| AppView::render(frame, state, ThemeMode::Dark, Appearance::Dark))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn renders_library_and_current_track() {
        let model = AppModel::new();
        let track = Track {
            uri: "spotify:track:1".into(),
            title: "Harvest Moon".into(),
            artists: vec!["Neil Young".into()],
            ..Default::default()
        };
        model.update_playback(|p| p.set_track_list(vec![track])).await;

        let text = rendered_text(&model.render_state().await);
        assert!(text.contains("Liked songs"));
        assert!(text.contains("Harvest Moon"));
    }

    #[tokio::test]
    async fn status_message_is_drawn() {
        let model = AppModel::new();
        model.set_status("Network error").await;

        let text = rendered_text(&model.render_state().await);
        assert!(text.contains("Network error"));
    }
}
