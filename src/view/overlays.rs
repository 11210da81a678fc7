//! Overlay rendering (status notification, device picker, help popup, lyrics)

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::model::{DevicePicker, LyricsState, Track};

use super::utils::{centered_rect, Palette};

pub fn render_status_notification(frame: &mut Frame, message: &str, palette: &Palette) {
    let area = frame.area();

    // Fixed width popup (responsive to screen size)
    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize;

    let line_count = message.chars().count().div_ceil(inner_width) as u16;

    // Height: top border (1) + message lines + bottom border (1)
    let popup_height = (2 + line_count.max(1)).min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let widget = Paragraph::new(message.to_string())
        .style(Style::default().fg(palette.warning))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.warning))
                .title(" Notice (Esc to dismiss) ")
                .title_style(Style::default().fg(palette.warning).add_modifier(Modifier::BOLD))
                .style(palette.base()),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_device_picker(frame: &mut Frame, picker: &DevicePicker, palette: &Palette) {
    let area = frame.area();

    let max_name_len = picker
        .devices
        .iter()
        .map(|d| d.name.chars().count() + 6) // icon + name + spacing
        .max()
        .unwrap_or(30);

    let popup_width = (max_name_len as u16 + 6).clamp(35, 60);
    let popup_height = (picker.devices.len() as u16 + 4).min(area.height.saturating_sub(4)).max(6);

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = picker
        .devices
        .iter()
        .enumerate()
        .map(|(i, device)| {
            let active_indicator = if device.is_active { " ●" } else { "" };
            let text = format!("🎵 {}{}", device.name, active_indicator);

            let style = if i == picker.selected {
                Style::default()
                    .fg(palette.background)
                    .bg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else if device.is_active {
                Style::default().fg(palette.accent)
            } else {
                Style::default().fg(palette.text)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.info))
            .title(" Select Device (j/k Enter Esc) ")
            .title_style(Style::default().fg(palette.info).add_modifier(Modifier::BOLD))
            .style(palette.base()),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

pub fn render_help_popup(frame: &mut Frame, palette: &Palette) {
    let area = frame.area();

    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle focus"),
        ("j / k", "Move selection"),
        ("< / >", "Switch search category"),
        ("Enter", "Open / Play"),
        ("Backspace / Esc", "Go back"),
        ("/", "Focus search"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("← / →", "Previous / Next in list"),
        ("↑ / ↓", "Volume up / down"),
        ("n / p", "Next / Previous (remote)"),
        ("[ / ]", "Seek -10s / +10s"),
        ("L", "Toggle lyrics"),
        ("", ""),
        ("", "── Actions ──"),
        ("x", "Like / Unlike track"),
        ("d", "Device picker"),
        ("t", "Toggle light / dark"),
        ("a", "Cycle theme mode"),
        ("", ""),
        ("", "── General ──"),
        ("?", "Toggle this help"),
        ("q", "Quit"),
    ];

    let popup_width = 62.min(area.width);
    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(palette.info).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(palette.text)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).style(palette.base()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.info))
            .title(" Help (? or Esc to close) ")
            .title_style(Style::default().fg(palette.info).add_modifier(Modifier::BOLD))
            .style(palette.base()),
    );

    frame.render_widget(help_text, popup_area);
}

pub fn render_lyrics(frame: &mut Frame, track: Option<&Track>, lyrics: &LyricsState, palette: &Palette) {
    let popup_area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, popup_area);

    let title = match track {
        Some(track) => format!(" Lyrics: {} - {} (L to close) ", track.title, track.artist_line()),
        None => " Lyrics (L to close) ".to_string(),
    };

    let showing_current = track.is_some_and(|t| t.uri == lyrics.track_uri);
    let (body, style) = match (&lyrics.text, lyrics.is_loading) {
        _ if track.is_none() => ("Nothing is playing".to_string(), Style::default().fg(palette.dim)),
        (_, true) => ("Loading lyrics...".to_string(), Style::default().fg(palette.info)),
        (Some(text), false) if showing_current => (text.clone(), Style::default().fg(palette.text)),
        _ => ("No lyrics found for this track".to_string(), Style::default().fg(palette.dim)),
    };

    let widget = Paragraph::new(body).style(style).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(title)
            .style(palette.base()),
    );

    frame.render_widget(widget, popup_area);
}
