use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_muted: String,
    pub accent: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// User themes in `<config_dir>/mathquiz/themes/` shadow the built-in ones.
    pub fn load(name: &str) -> Option<Self> {
        Self::load_from_dir(&Config::config_dir().join("themes"), name)
            .or_else(|| Self::builtin(name))
    }

    pub fn load_from_dir(dir: &Path, name: &str) -> Option<Self> {
        let path = dir.join(format!("{name}.toml"));
        let content = fs::read_to_string(&path).ok()?;
        match toml::from_str::<Theme>(&content) {
            Ok(theme) => Some(theme),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable theme");
                None
            }
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        let colors = match name {
            "default" => ThemeColors::default(),
            "paper" => ThemeColors::paper(),
            _ => return None,
        };
        Some(Self {
            name: name.to_string(),
            colors,
        })
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            text_muted: "#6c7086".to_string(),
            accent: "#89b4fa".to_string(),
            border: "#45475a".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            bar_filled: "#89b4fa".to_string(),
            bar_empty: "#313244".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

impl ThemeColors {
    fn paper() -> Self {
        Self {
            bg: "#fdf6e3".to_string(),
            fg: "#3b3a32".to_string(),
            text_muted: "#93a1a1".to_string(),
            accent: "#268bd2".to_string(),
            border: "#93a1a1".to_string(),
            header_bg: "#eee8d5".to_string(),
            header_fg: "#3b3a32".to_string(),
            bar_filled: "#268bd2".to_string(),
            bar_empty: "#eee8d5".to_string(),
            error: "#dc322f".to_string(),
            warning: "#b58900".to_string(),
            success: "#859900".to_string(),
        }
    }

    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_muted(&self) -> Color { Self::parse_color(&self.text_muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#ff0080"), Color::Rgb(255, 0, 128));
        assert_eq!(ThemeColors::parse_color("nonsense"), Color::White);
    }

    #[test]
    fn test_builtin_themes_resolve() {
        for name in ["default", "paper"] {
            assert_eq!(Theme::builtin(name).unwrap().name, name);
        }
        assert!(Theme::builtin("missing").is_none());
    }

    #[test]
    fn test_user_theme_file() {
        let dir = TempDir::new().unwrap();
        let theme = Theme {
            name: "mine".to_string(),
            colors: ThemeColors::paper(),
        };
        fs::write(dir.path().join("mine.toml"), toml::to_string_pretty(&theme).unwrap()).unwrap();
        let loaded = Theme::load_from_dir(dir.path(), "mine").unwrap();
        assert_eq!(loaded.colors.bg, "#fdf6e3");

        fs::write(dir.path().join("broken.toml"), "name = 3").unwrap();
        assert!(Theme::load_from_dir(dir.path(), "broken").is_none());
    }
}
