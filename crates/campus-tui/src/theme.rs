//! Theme system for the campus TUI.
//!
//! Color themes with runtime switching, persisted to
//! `~/.campus/theme.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use campus_core::Severity;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Theme name identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Default,
    /// Enhanced contrast
    Dark,
    /// For bright environments
    Light,
}

impl ThemeName {
    /// All available themes in cycle order.
    pub fn all() -> &'static [ThemeName] {
        &[ThemeName::Default, ThemeName::Dark, ThemeName::Light]
    }

    /// Get the next theme in the cycle.
    pub fn next(&self) -> ThemeName {
        let themes = Self::all();
        let current_idx = themes.iter().position(|t| t == self).unwrap_or(0);
        themes[(current_idx + 1) % themes.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::Dark => "Dark",
            ThemeName::Light => "Light",
        }
    }

    /// Parse a theme name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Some(ThemeName::Default),
            "dark" => Some(ThemeName::Dark),
            "light" => Some(ThemeName::Light),
            _ => None,
        }
    }
}

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Headers and focused borders
    pub header: Color,
    /// Hotkey hints
    pub hotkey: Color,
    pub text: Color,
    /// Secondary text (hints, placeholders)
    pub text_dim: Color,
    /// Unfocused borders
    pub border_dim: Color,
    /// Focused outline row
    pub focus_highlight: Color,
    /// Text being edited
    pub editing: Color,
    pub status_success: Color,
    pub status_info: Color,
    pub status_warning: Color,
    pub status_error: Color,
}

/// Complete theme definition.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: ThemeName::Default,
            colors: ThemeColors {
                header: Color::Cyan,
                hotkey: Color::Yellow,
                text: Color::White,
                text_dim: Color::Gray,
                border_dim: Color::DarkGray,
                focus_highlight: Color::Cyan,
                editing: Color::LightYellow,
                status_success: Color::Green,
                status_info: Color::Blue,
                status_warning: Color::Yellow,
                status_error: Color::Red,
            },
        }
    }

    pub fn dark_theme() -> Self {
        Self {
            name: ThemeName::Dark,
            colors: ThemeColors {
                header: Color::LightBlue,
                hotkey: Color::LightYellow,
                text: Color::White,
                text_dim: Color::DarkGray,
                border_dim: Color::Black,
                focus_highlight: Color::LightYellow,
                editing: Color::LightCyan,
                status_success: Color::LightGreen,
                status_info: Color::LightBlue,
                status_warning: Color::LightYellow,
                status_error: Color::LightRed,
            },
        }
    }

    pub fn light_theme() -> Self {
        Self {
            name: ThemeName::Light,
            colors: ThemeColors {
                header: Color::Blue,
                hotkey: Color::DarkGray,
                text: Color::Black,
                text_dim: Color::DarkGray,
                border_dim: Color::Gray,
                focus_highlight: Color::Rgb(0, 100, 255),
                editing: Color::Magenta,
                status_success: Color::Green,
                status_info: Color::Blue,
                status_warning: Color::Rgb(180, 120, 0),
                status_error: Color::Red,
            },
        }
    }

    pub fn by_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default_theme(),
            ThemeName::Dark => Self::dark_theme(),
            ThemeName::Light => Self::light_theme(),
        }
    }

    /// Color for alerts and toasts of `severity`.
    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.colors.status_success,
            Severity::Info => self.colors.status_info,
            Severity::Warning => self.colors.status_warning,
            Severity::Error => self.colors.status_error,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

/// Persisted theme selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub current_theme: ThemeName,
}

/// Theme manager with runtime switching.
#[derive(Debug)]
pub struct ThemeManager {
    current: Theme,
    /// Where the selection is saved; `None` keeps it in memory only
    config_path: Option<PathBuf>,
}

impl ThemeManager {
    /// Default theme, not persisted.
    pub fn new() -> Self {
        Self {
            current: Theme::default_theme(),
            config_path: None,
        }
    }

    /// Default location of the theme file, `~/.campus/theme.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".campus").join("theme.yaml"))
    }

    /// Load the saved theme from `path`, falling back to the default theme
    /// when the file is missing or unreadable. Later changes are saved there.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = match Self::read_config(&path) {
            Ok(Some(config)) => {
                tracing::info!(theme = config.current_theme.display_name(), "Loaded theme");
                config.current_theme
            }
            Ok(None) => ThemeName::Default,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Ignoring theme file");
                ThemeName::Default
            }
        };
        Self {
            current: Theme::by_name(name),
            config_path: Some(path),
        }
    }

    fn read_config(path: &Path) -> Result<Option<ThemeConfig>, Box<dyn std::error::Error>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_yaml::from_str(&content)?))
    }

    pub fn save_config(&self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        let config = ThemeConfig {
            current_theme: self.current.name,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(&config)?)?;
        tracing::debug!(path = %path.display(), "Saved theme config");
        Ok(())
    }

    pub fn current(&self) -> &Theme {
        &self.current
    }

    /// Switch to the next theme in the cycle and save it.
    pub fn cycle_theme(&mut self) -> ThemeName {
        let next_name = self.current.name.next();
        self.current = Theme::by_name(next_name);
        if let Err(e) = self.save_config() {
            tracing::warn!(error = %e, "Failed to save theme config");
        }
        next_name
    }

    pub fn theme_name(&self) -> ThemeName {
        self.current.name
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_theme_name_cycle() {
        assert_eq!(ThemeName::Default.next(), ThemeName::Dark);
        assert_eq!(ThemeName::Dark.next(), ThemeName::Light);
        assert_eq!(ThemeName::Light.next(), ThemeName::Default);
    }

    #[test]
    fn test_theme_name_parse() {
        assert_eq!(ThemeName::parse("DARK"), Some(ThemeName::Dark));
        assert_eq!(ThemeName::parse(" light "), Some(ThemeName::Light));
        assert_eq!(ThemeName::parse("neon"), None);
    }

    #[test]
    fn test_severity_colors() {
        let theme = Theme::default_theme();
        assert_eq!(theme.severity_color(Severity::Error), Color::Red);
        assert_eq!(theme.severity_color(Severity::Success), Color::Green);
    }

    #[test]
    fn test_in_memory_manager_cycles() {
        let mut manager = ThemeManager::new();
        assert_eq!(manager.cycle_theme(), ThemeName::Dark);
        assert_eq!(manager.theme_name(), ThemeName::Dark);
    }

    #[test]
    fn test_cycle_persists_selection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("theme.yaml");

        let mut manager = ThemeManager::load(&path);
        assert_eq!(manager.theme_name(), ThemeName::Default);
        manager.cycle_theme();
        manager.cycle_theme();

        let reloaded = ThemeManager::load(&path);
        assert_eq!(reloaded.theme_name(), ThemeName::Light);
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.yaml");
        fs::write(&path, "current_theme: [not, a, theme]").unwrap();
        assert_eq!(ThemeManager::load(&path).theme_name(), ThemeName::Default);
    }

    #[test]
    #[serial]
    fn test_default_path_under_home() {
        // SAFETY: serialized test, no other thread reads HOME concurrently
        unsafe { std::env::set_var("HOME", "/tmp/campus-home") };
        assert_eq!(
            ThemeManager::default_path(),
            Some(PathBuf::from("/tmp/campus-home/.campus/theme.yaml"))
        );
    }
}
