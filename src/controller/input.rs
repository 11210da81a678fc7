//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::model::{Focus, SelectedItem};

use super::AppController;
use super::shortcuts::Shortcut;

/// Ctrl-C. The event loop checks this before queueing, so quitting works
/// while a handler waits on the network.
pub fn is_force_quit(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.code == KeyCode::Char('c')
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

impl AppController {
    /// Handle keys on a background task, one at a time in arrival order.
    /// The worker stops once every sender is dropped.
    pub fn spawn_key_worker(&self) -> UnboundedSender<KeyEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel::<KeyEvent>();
        let controller = self.clone();
        tokio::spawn(async move {
            while let Some(key) = rx.recv().await {
                controller.handle_key_event(key).await;
            }
            tracing::debug!("Key worker stopped");
        });
        tx
    }

    pub async fn handle_key_event(&self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if is_force_quit(&key) {
            self.model.lock().await.set_should_quit(true).await;
            return;
        }

        let model = self.model.lock().await;

        // Esc/Enter dismiss the status line; other keys go through
        if model.has_status().await && matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            model.clear_status().await;
            return;
        }

        if model.is_help_visible().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                model.set_help_visible(false).await;
            }
            return;
        }

        if model.is_device_picker_open().await {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => model.device_picker_move(false).await,
                KeyCode::Down | KeyCode::Char('j') => model.device_picker_move(true).await,
                KeyCode::Enter => {
                    let device = model.selected_device().await;
                    model.hide_device_picker().await;
                    drop(model);
                    if let Some(device) = device {
                        self.select_device(&device).await;
                    }
                }
                KeyCode::Esc | KeyCode::Char('d') => model.hide_device_picker().await,
                _ => {}
            }
            return;
        }

        let focus = model.focus().await;

        // Typing into the search box never triggers shortcuts
        if focus.is_text_entry() {
            match key.code {
                KeyCode::Tab => model.cycle_focus(true).await,
                KeyCode::BackTab => model.cycle_focus(false).await,
                KeyCode::Enter => {
                    let query = model.search_query().await;
                    drop(model);
                    if !query.trim().is_empty() {
                        self.perform_search(query.trim()).await;
                    }
                }
                KeyCode::Esc => model.set_focus(Focus::Library).await,
                KeyCode::Backspace => model.backspace_search().await,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    model.append_to_search(c).await;
                }
                _ => {}
            }
            return;
        }
        drop(model);

        if let Some(shortcut) = Shortcut::from_key(&key) {
            self.dispatch_shortcut(shortcut).await;
            return;
        }

        let handled = match focus {
            Focus::Library => self.handle_library_key(key.code).await,
            Focus::Content => self.handle_content_key(key.code).await,
            Focus::Search => false,
        };
        if !handled {
            self.handle_global_key(key.code).await;
        }
    }

    async fn handle_library_key(&self, code: KeyCode) -> bool {
        let model = self.model.lock().await;
        match code {
            KeyCode::Char('j') => model.move_library_selection(true).await,
            KeyCode::Char('k') => model.move_library_selection(false).await,
            KeyCode::Enter => {
                let section = model.selected_library_section().await;
                drop(model);
                self.open_library_section(section).await;
            }
            _ => return false,
        }
        true
    }

    async fn handle_content_key(&self, code: KeyCode) -> bool {
        let model = self.model.lock().await;
        match code {
            KeyCode::Char('k') => model.content_move(false).await,
            KeyCode::Char('j') => {
                model.content_move(true).await;
                if let Some(more) = model.take_more_request().await {
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.load_more_playlist_tracks(more).await;
                    });
                }
            }
            KeyCode::Char('<') => model.content_cycle_section(false).await,
            KeyCode::Char('>') => model.content_cycle_section(true).await,
            KeyCode::Enter => {
                let selected = model.selected_content_item().await;
                drop(model);
                if let Some(item) = selected {
                    self.handle_selected_item(item).await;
                }
            }
            KeyCode::Backspace | KeyCode::Esc => {
                model.navigate_back().await;
            }
            KeyCode::Char('x') => {
                let selected = model.selected_content_item().await;
                drop(model);
                if let Some(SelectedItem::Track { tracks, index }) = selected {
                    if let Some(track) = tracks.get(index) {
                        self.toggle_liked_track(track).await;
                    }
                }
            }
            _ => return false,
        }
        true
    }

    async fn handle_global_key(&self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.model.lock().await.set_should_quit(true).await,
            KeyCode::Tab => self.model.lock().await.cycle_focus(true).await,
            KeyCode::BackTab => self.model.lock().await.cycle_focus(false).await,
            KeyCode::Char('/') => self.model.lock().await.set_focus(Focus::Search).await,
            KeyCode::Char('?') => self.model.lock().await.set_help_visible(true).await,
            KeyCode::Char('t') => {
                let mode = {
                    let mut theme = self.theme.lock().await;
                    theme.toggle_theme();
                    theme.selected()
                };
                self.model.lock().await.set_status(format!("Theme: {}", mode)).await;
            }
            KeyCode::Char('a') => {
                let mode = {
                    let mut theme = self.theme.lock().await;
                    theme.cycle_mode();
                    theme.selected()
                };
                self.model.lock().await.set_status(format!("Theme: {}", mode)).await;
            }
            KeyCode::Char('d') => self.open_device_picker().await,
            KeyCode::Char('n') => self.next_track().await,
            KeyCode::Char('p') => self.previous_track().await,
            KeyCode::Char('[') => self.seek_relative(false).await,
            KeyCode::Char(']') => self.seek_relative(true).await,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::harness;
    use super::*;
    use crate::theme::ThemeMode;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn only_ctrl_c_forces_quit() {
        assert!(is_force_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_force_quit(&press(KeyCode::Char('c'))));
        assert!(!is_force_quit(&press(KeyCode::Char('q'))));
    }

    #[tokio::test]
    async fn queued_keys_run_in_order() {
        let h = harness();
        let keys = h.controller.spawn_key_worker();
        for c in "abc".chars() {
            keys.send(press(KeyCode::Char('/'))).unwrap();
            keys.send(press(KeyCode::Char(c))).unwrap();
            keys.send(press(KeyCode::Esc)).unwrap();
        }
        keys.send(press(KeyCode::Char('/'))).unwrap();
        keys.send(press(KeyCode::Char('d'))).unwrap();

        // Ordering is visible in the query: each char lands only after its '/'
        let mut query = String::new();
        for _ in 0..200 {
            query = h.controller.model.lock().await.search_query().await;
            if query == "abcd" {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(query, "abcd");
    }

    #[tokio::test]
    async fn stuck_handler_leaves_model_reachable_for_quit() {
        let h = harness();
        h.load(&["a"], "dev").await;
        let gate = std::sync::Arc::new(tokio::sync::Notify::new());
        *h.player.gate.lock().unwrap() = Some(gate.clone());

        let keys = h.controller.spawn_key_worker();
        keys.send(press(KeyCode::Char(' '))).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(h.player.calls().is_empty());

        // The play call is parked; the event loop can still take the lock and quit
        let model = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            h.controller.model.lock(),
        )
        .await
        .expect("model lock held across a remote call");
        model.set_should_quit(true).await;
        assert!(model.should_quit().await);
        drop(model);

        gate.notify_one();
        for _ in 0..200 {
            if !h.player.calls().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(h.player.calls(), vec!["play a dev"]);
    }

    #[tokio::test]
    async fn search_focus_suppresses_every_shortcut() {
        let h = harness();
        h.load(&["a", "b", "c"], "dev").await;
        h.controller.model.lock().await.set_focus(Focus::Search).await;
        let before = h.controller.model.lock().await.playback().await;

        for code in [
            KeyCode::Char(' '),
            KeyCode::Right,
            KeyCode::Left,
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Char('l'),
            KeyCode::Char('L'),
        ] {
            h.controller.handle_key_event(press(code)).await;
        }

        let model = h.controller.model.lock().await;
        let after = model.playback().await;
        assert!(h.player.calls().is_empty());
        assert_eq!(after.current_index(), before.current_index());
        assert_eq!(after.is_playing(), before.is_playing());
        assert_eq!(after.current_volume(), before.current_volume());
        assert!(!model.toggles().await.lyrics_visible);
        assert_eq!(model.search_query().await, " lL");
    }

    #[tokio::test]
    async fn shortcuts_fire_outside_search() {
        let h = harness();
        h.load(&["a", "b"], "dev").await;

        h.controller.handle_key_event(press(KeyCode::Right)).await;
        h.controller.handle_key_event(press(KeyCode::Char('L'))).await;

        assert_eq!(h.player.calls(), vec!["play b dev"]);
        assert!(h.controller.model.lock().await.toggles().await.lyrics_visible);
    }

    #[tokio::test]
    async fn release_events_are_ignored() {
        let h = harness();
        h.load(&["a"], "dev").await;
        let mut key = press(KeyCode::Char(' '));
        key.kind = KeyEventKind::Release;

        h.controller.handle_key_event(key).await;
        assert!(h.player.calls().is_empty());
    }

    #[tokio::test]
    async fn tab_cycles_focus_and_q_quits() {
        let h = harness();
        h.controller.handle_key_event(press(KeyCode::Tab)).await;
        assert_eq!(h.controller.model.lock().await.focus().await, Focus::Content);

        h.controller.handle_key_event(press(KeyCode::Char('q'))).await;
        assert!(h.controller.model.lock().await.should_quit().await);
    }

    #[tokio::test]
    async fn theme_keys_change_selection() {
        let h = harness();
        h.controller.handle_key_event(press(KeyCode::Char('t'))).await;
        assert_eq!(h.controller.theme.lock().await.selected(), ThemeMode::Light);

        h.controller.handle_key_event(press(KeyCode::Esc)).await;
        h.controller.handle_key_event(press(KeyCode::Char('a'))).await;
        assert_eq!(h.controller.theme.lock().await.selected(), ThemeMode::Auto);
    }

    #[tokio::test]
    async fn help_overlay_swallows_keys() {
        let h = harness();
        h.load(&["a"], "dev").await;
        h.controller.handle_key_event(press(KeyCode::Char('?'))).await;
        h.controller.handle_key_event(press(KeyCode::Char(' '))).await;
        assert!(h.player.calls().is_empty());

        h.controller.handle_key_event(press(KeyCode::Esc)).await;
        assert!(!h.controller.model.lock().await.is_help_visible().await);
    }
}
