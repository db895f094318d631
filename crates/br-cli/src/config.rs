//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use br_core::TICK_INTERVAL;
use chrono::FixedOffset;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

const DEFAULT_OWNER: &str = "local";

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Whose log the commands read and write.
    pub owner: String,

    /// Fixed UTC offset for reading and printing local times.
    ///
    /// When unset, the system time zone is used.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    /// Cadence of `br watch`.
    pub tick_interval_ms: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("owner", &self.owner)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("tick_interval_ms", &self.tick_interval_ms)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("br.db"),
            owner: DEFAULT_OWNER.to_string(),
            utc_offset_minutes: None,
            tick_interval_ms: u64::try_from(TICK_INTERVAL.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Config {
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

        // Load from environment variables (BR_*)
        figment = figment.merge(Env::prefixed("BR_"));

        figment.extract()
    }

    /// The configured fixed offset, if any.
    pub fn fixed_offset(&self) -> anyhow::Result<Option<FixedOffset>> {
        self.utc_offset_minutes
            .map(|minutes| {
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .with_context(|| format!("utc_offset_minutes out of range: {minutes}"))
            })
            .transpose()
    }

    /// Tick cadence, never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Returns the platform-specific config directory for br.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("br"))
}

/// Returns the platform-specific data directory for br.
///
/// On Linux: `~/.local/share/br`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("br"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_br() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "br");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("br.db"));
        assert_eq!(config.owner, "local");
        assert_eq!(config.utc_offset_minutes, None);
        assert_eq!(config.tick_interval(), TICK_INTERVAL);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "owner = \"alice\"\nutc_offset_minutes = 120\ntick_interval_ms = 250\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.owner, "alice");
        assert_eq!(
            config.fixed_offset().unwrap(),
            FixedOffset::east_opt(7200)
        );
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_fixed_offset_out_of_range() {
        let config = Config {
            utc_offset_minutes: Some(24 * 60),
            ..Config::default()
        };
        assert!(config.fixed_offset().is_err());
    }

    #[test]
    fn test_zero_tick_interval_is_clamped() {
        let config = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
