use crate::theme::{Theme, DEFAULT_ACCENT};
use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

pub const DEFAULT_GROUP_PANE_PERCENT: u16 = 25;
pub const DEFAULT_RESOURCE_PANE_PERCENT: u16 = 25;
const MIN_DETAIL_PANE_PERCENT: u16 = 20;
const MIN_PANE_PERCENT: u16 = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    group_pane_percent: Option<u16>,
    resource_pane_percent: Option<u16>,
    show_help: Option<bool>,
    accent_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub group_percent: u16,
    pub resource_percent: u16,
}

impl PaneLayout {
    pub fn detail_percent(&self) -> u16 {
        100 - self.group_percent - self.resource_percent
    }

    fn clamped(group: u16, resource: u16) -> Self {
        let room = 100 - MIN_DETAIL_PANE_PERCENT;
        let group_percent = group.clamp(MIN_PANE_PERCENT, room - MIN_PANE_PERCENT);
        let resource_percent = resource.clamp(MIN_PANE_PERCENT, room - group_percent);
        Self {
            group_percent,
            resource_percent,
        }
    }
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self {
            group_percent: DEFAULT_GROUP_PANE_PERCENT,
            resource_percent: DEFAULT_RESOURCE_PANE_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub layout: PaneLayout,
    pub show_help: bool,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: PaneLayout::default(),
            show_help: true,
            theme: Theme::default(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tfviz").join("config.toml"))
}

/// Reads the user config if there is one. Problems fall back to defaults so
/// the viewer always starts.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match load_config_from(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), "ignoring config file: {err:#}");
            Config::default()
        }
    }
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let file: FileConfig = toml::from_str(contents)?;

    let accent = match file.accent_color.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Color::from_str(name)
            .map_err(|_| anyhow::anyhow!("unknown accent_color '{name}'"))?,
        _ => DEFAULT_ACCENT,
    };

    Ok(Config {
        layout: PaneLayout::clamped(
            file.group_pane_percent.unwrap_or(DEFAULT_GROUP_PANE_PERCENT),
            file.resource_pane_percent.unwrap_or(DEFAULT_RESOURCE_PANE_PERCENT),
        ),
        show_help: file.show_help.unwrap_or(true),
        theme: Theme::with_accent(accent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.layout.detail_percent(), 50);
    }

    #[test]
    fn reads_layout_help_and_accent() {
        let config = parse_config(
            r##"
group_pane_percent = 30
resource_pane_percent = 20
show_help = false
accent_color = "#ff8800"
"##,
        )
        .expect("parse");

        assert_eq!(config.layout.group_percent, 30);
        assert_eq!(config.layout.resource_percent, 20);
        assert!(!config.show_help);
        assert_eq!(config.theme.accent, Color::Rgb(255, 136, 0));
    }

    #[test]
    fn pane_percentages_leave_room_for_details() {
        let config = parse_config("group_pane_percent = 90\nresource_pane_percent = 90\n")
            .expect("parse");
        assert_eq!(config.layout.group_percent, 70);
        assert_eq!(config.layout.resource_percent, 10);
        assert_eq!(config.layout.detail_percent(), 20);

        let config = parse_config("group_pane_percent = 0\n").expect("parse");
        assert_eq!(config.layout.group_percent, MIN_PANE_PERCENT);
    }

    #[test]
    fn rejects_unknown_accent_and_bad_toml() {
        assert!(parse_config("accent_color = \"not-a-colour\"").is_err());
        assert!(parse_config("group_pane_percent = \"wide\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from(&dir.path().join("config.toml")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "accent_color = \"magenta\"").expect("write");
        let config = load_config_from(file.path()).expect("load");
        assert_eq!(config.theme.accent, Color::Magenta);
    }
}
