//! Application-session state passed explicitly to whoever needs it.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Presentation preferences scoped to one application session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub current_page: String,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            sidebar_collapsed: false,
            current_page: "dashboard".to_string(),
        }
    }
}

impl UiPreferences {
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    pub fn set_current_page(&mut self, page: impl Into<String>) {
        self.current_page = page.into();
    }
}

/// Owns the loaded configuration and the session's UI preferences.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub preferences: UiPreferences,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let preferences = UiPreferences {
            theme: config.ui.theme,
            sidebar_collapsed: config.ui.sidebar_collapsed,
            ..UiPreferences::default()
        };
        Self {
            config,
            preferences,
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_seeded_from_config() {
        let mut config = AppConfig::default();
        config.ui.theme = Theme::Dark;
        config.ui.sidebar_collapsed = true;

        let ctx = AppContext::new(config);
        assert_eq!(ctx.preferences.theme, Theme::Dark);
        assert!(ctx.preferences.sidebar_collapsed);
        assert_eq!(ctx.preferences.current_page, "dashboard");
    }

    #[test]
    fn test_toggles() {
        let mut prefs = UiPreferences::default();
        prefs.toggle_theme();
        assert_eq!(prefs.theme, Theme::Dark);
        prefs.toggle_theme();
        assert_eq!(prefs.theme, Theme::Light);

        prefs.toggle_sidebar();
        assert!(prefs.sidebar_collapsed);

        prefs.set_current_page("journeys");
        assert_eq!(prefs.current_page, "journeys");
    }
}
