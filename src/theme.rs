//! Light/dark/auto theme selection

use std::fmt;
use std::str::FromStr;

use crate::storage::{SessionStore, THEME_KEY};

/// What the user picked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
    Auto,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
            ThemeMode::Auto => "auto",
        }
    }

    fn next(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Auto,
            ThemeMode::Auto => ThemeMode::Dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeMode {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            "auto" => Ok(ThemeMode::Auto),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

/// What is actually rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Appearance {
    #[default]
    Dark,
    Light,
}

impl Appearance {
    pub fn opposite(self) -> Self {
        match self {
            Appearance::Dark => Appearance::Light,
            Appearance::Light => Appearance::Dark,
        }
    }

    fn as_mode(self) -> ThemeMode {
        match self {
            Appearance::Dark => ThemeMode::Dark,
            Appearance::Light => ThemeMode::Light,
        }
    }
}

/// Holds the selected mode and the applied appearance. The selected mode is
/// written to session storage on every change.
pub struct ThemeController {
    selected: ThemeMode,
    applied: Appearance,
    os_preference: Appearance,
    storage: Option<SessionStore>,
}

impl ThemeController {
    /// Read the persisted mode; a missing or unrecognised value means dark.
    pub fn init(storage: Option<SessionStore>, os_preference: Appearance) -> Self {
        let selected = storage
            .as_ref()
            .and_then(|s| s.get(THEME_KEY))
            .and_then(|value| match value.parse::<ThemeMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring persisted theme");
                    None
                }
            })
            .unwrap_or_default();

        let mut controller = Self {
            selected,
            applied: Appearance::Dark,
            os_preference,
            storage,
        };
        controller.applied = controller.resolve();
        tracing::debug!(selected = %controller.selected, applied = ?controller.applied, "Theme initialized");
        controller
    }

    fn resolve(&self) -> Appearance {
        match self.selected {
            ThemeMode::Dark => Appearance::Dark,
            ThemeMode::Light => Appearance::Light,
            ThemeMode::Auto => self.os_preference,
        }
    }

    pub fn set_theme(&mut self, mode: ThemeMode) {
        self.selected = mode;
        self.applied = self.resolve();
        tracing::info!(selected = %mode, applied = ?self.applied, "Theme changed");

        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set(THEME_KEY, mode.as_str()) {
                tracing::warn!(error = %e, "Failed to persist theme");
            }
        }
    }

    /// Dark and light swap; auto leaves auto for the opposite of the OS preference.
    pub fn toggle_theme(&mut self) {
        let next = match self.selected {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Auto => self.os_preference.opposite().as_mode(),
        };
        self.set_theme(next);
    }

    pub fn cycle_mode(&mut self) {
        self.set_theme(self.selected.next());
    }

    /// Only moves the applied appearance while the selected mode is auto.
    pub fn on_os_preference_changed(&mut self, preference: Appearance) {
        self.os_preference = preference;
        if self.selected == ThemeMode::Auto && self.applied != preference {
            self.applied = preference;
            tracing::info!(applied = ?preference, "Applied OS appearance");
        }
    }

    pub fn selected(&self) -> ThemeMode {
        self.selected
    }

    pub fn applied(&self) -> Appearance {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_dark_without_storage() {
        let theme = ThemeController::init(None, Appearance::Light);
        assert_eq!(theme.selected(), ThemeMode::Dark);
        assert_eq!(theme.applied(), Appearance::Dark);
    }

    #[test]
    fn invalid_persisted_value_falls_back_to_dark() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("storage.json"));
        store.set(THEME_KEY, "purple").unwrap();

        let theme = ThemeController::init(Some(store), Appearance::Light);
        assert_eq!(theme.selected(), ThemeMode::Dark);
    }

    #[test]
    fn parse_accepts_any_case_and_names_the_bad_value() {
        assert_eq!(" Light ".parse::<ThemeMode>(), Ok(ThemeMode::Light));

        let err = "purple".parse::<ThemeMode>().unwrap_err();
        assert_eq!(err, UnknownTheme("purple".to_string()));
        assert_eq!(err.to_string(), "unknown theme 'purple'");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn auto_follows_os_preference_without_changing_selection() {
        let mut theme = ThemeController::init(None, Appearance::Dark);
        theme.set_theme(ThemeMode::Auto);

        theme.on_os_preference_changed(Appearance::Light);
        assert_eq!(theme.applied(), Appearance::Light);
        theme.on_os_preference_changed(Appearance::Dark);
        assert_eq!(theme.applied(), Appearance::Dark);
        assert_eq!(theme.selected(), ThemeMode::Auto);
    }

    #[test]
    fn os_preference_ignored_outside_auto() {
        let mut theme = ThemeController::init(None, Appearance::Dark);
        theme.on_os_preference_changed(Appearance::Light);
        assert_eq!(theme.applied(), Appearance::Dark);

        // Remembered for when auto is picked later
        theme.set_theme(ThemeMode::Auto);
        assert_eq!(theme.applied(), Appearance::Light);
    }

    #[test]
    fn toggle_from_dark_goes_light() {
        let mut theme = ThemeController::init(None, Appearance::Dark);
        theme.toggle_theme();
        assert_eq!(theme.selected(), ThemeMode::Light);
        assert_eq!(theme.applied(), Appearance::Light);
        theme.toggle_theme();
        assert_eq!(theme.selected(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_from_auto_picks_opposite_of_os() {
        let mut theme = ThemeController::init(None, Appearance::Light);
        theme.set_theme(ThemeMode::Auto);
        theme.toggle_theme();
        assert_eq!(theme.selected(), ThemeMode::Dark);
        assert_eq!(theme.applied(), Appearance::Dark);
    }

    #[test]
    fn selection_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut theme = ThemeController::init(Some(SessionStore::open(&path)), Appearance::Dark);
        theme.set_theme(ThemeMode::Auto);

        let reopened = ThemeController::init(Some(SessionStore::open(&path)), Appearance::Light);
        assert_eq!(reopened.selected(), ThemeMode::Auto);
        assert_eq!(reopened.applied(), Appearance::Light);
    }

    #[test]
    fn cycle_visits_every_mode() {
        let mut theme = ThemeController::init(None, Appearance::Dark);
        theme.cycle_mode();
        assert_eq!(theme.selected(), ThemeMode::Light);
        theme.cycle_mode();
        assert_eq!(theme.selected(), ThemeMode::Auto);
        theme.cycle_mode();
        assert_eq!(theme.selected(), ThemeMode::Dark);
    }
}
