//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackState;

use super::utils::{format_duration, Palette};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackState, palette: &Palette) {
    let status_text = match playback.current_track() {
        None => " No track playing".to_string(),
        Some(track) => {
            let icon = if playback.is_playing() { " ▶" } else { "⏸ " };
            if track.album.is_empty() {
                format!("{} {} | {}", icon, track.title, track.artist_line())
            } else {
                format!("{} {} | {} ({})", icon, track.title, track.artist_line(), track.album)
            }
        }
    };

    let position = if playback.track_list().is_empty() {
        String::new()
    } else {
        format!("{}/{} | ", playback.current_index() + 1, playback.track_list().len())
    };
    let controls_info = format!(" {}Vol: {}% ", position, playback.volume_percent());

    let progress_ms = playback.progress_ms();
    let duration_ms = playback.duration_ms();
    let time_str = format!("{} / {}", format_duration(progress_ms), format_duration(duration_ms));

    let progress_ratio = if duration_ms > 0 {
        (progress_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned())
                .border_style(palette.border(false)),
        )
        .gauge_style(Style::default().fg(palette.accent))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
