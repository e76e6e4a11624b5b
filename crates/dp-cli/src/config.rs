//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use dp_core::{Color, LayoutConfig};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Color for new events created without `--color`.
    pub default_color: Color,

    /// Grid settings for `dp day`.
    pub layout: LayoutConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("default_color", &self.default_color.as_str())
            .field("layout", &self.layout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("dp.db"),
            default_color: Color::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (DP_*, DP_LAYOUT__* for nested keys)
        figment = figment.merge(Env::prefixed("DP_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for dp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dayplan"))
}

/// Returns the platform-specific data directory for dp.
///
/// On Linux: `~/.local/share/dayplan`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("dayplan"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use dp_core::ColumnWidthMode;

    #[test]
    fn test_dirs_data_path_ends_with_dayplan() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "dayplan");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("dp.db"));
        assert_eq!(config.default_color, Color::default());
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r##"
database_path = "/tmp/planner.db"
default_color = "#388e3c"

[layout]
visible_start_hour = 8
width_mode = "cluster"
"##,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/planner.db"));
        assert_eq!(config.default_color.as_str(), "#388e3c");
        assert_eq!(config.layout.visible_start_hour, 8);
        assert_eq!(config.layout.visible_end_hour, 23);
        assert_eq!(config.layout.width_mode, ColumnWidthMode::Cluster);
    }

    #[test]
    fn test_load_rejects_invalid_color() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "default_color = \"blue\"\n").unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }
}
