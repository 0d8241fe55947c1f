//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use tl_core::{DEFAULT_NOISE_THRESHOLD, TaskSort};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Ranges shorter than this are discarded when their task is deselected.
    pub noise_threshold_secs: i64,
    /// Task order used by `tl tasks` when `--sort` is not given.
    pub default_sort: TaskSort,
    /// List hidden tasks by default.
    pub show_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tl.db"),
            noise_threshold_secs: DEFAULT_NOISE_THRESHOLD.num_seconds(),
            default_sort: TaskSort::default(),
            show_hidden: false,
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
        Self::figment(config_path).extract()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TL_DATABASE_PATH, TL_NOISE_THRESHOLD_SECS, ...
        figment.merge(Env::prefixed("TL_"))
    }
}

/// Returns the platform-specific config directory for tl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

/// Returns the platform-specific data directory for tl.
///
/// On Linux: `~/.local/share/tl`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    #[test]
    fn test_dirs_data_path_ends_with_tl() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("tl.db"));
        assert_eq!(config.noise_threshold_secs, 60);
        assert_eq!(config.default_sort, TaskSort::Name);
        assert!(!config.show_hidden);
    }

    #[test]
    fn test_config_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                database_path = "/tmp/custom.db"
                noise_threshold_secs = 300
                default_sort = "usage"
                "#,
            )?;
            jail.set_env("TL_SHOW_HIDDEN", "true");
            jail.set_env("TL_NOISE_THRESHOLD_SECS", "5");

            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
            assert_eq!(config.default_sort, TaskSort::Usage);
            assert_eq!(config.noise_threshold_secs, 5);
            assert!(config.show_hidden);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_sort_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TL_DEFAULT_SORT", "size");
            assert!(Config::load().is_err());
            Ok(())
        });
    }
}
