//! Configuration loading and management.

use std::path::{Path, PathBuf};

use concur_core::{DEFAULT_PERIOD_SECS, DEFAULT_PROGRESS_EVERY, MalformedPolicy};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
///
/// Command-line flags take precedence over every value here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Width of each time bin in seconds.
    pub period: f64,

    /// Lines between progress messages. Zero disables them.
    pub progress_every: usize,

    /// Also report the final, partially covered bin.
    pub flush_trailing_bin: bool,

    /// What to do with COPY lines that lack a usable required field.
    pub malformed: MalformedPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD_SECS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            flush_trailing_bin: false,
            malformed: MalformedPolicy::Abort,
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

        // Load from environment variables (CONCUR_*)
        figment = figment.merge(Env::prefixed("CONCUR_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for concur.
///
/// On Linux: `~/.config/concur`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("concur"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_concur() {
        if let Some(path) = dirs_config_path() {
            assert_eq!(path.file_name().unwrap(), "concur");
        }
    }

    #[test]
    fn test_default_config_matches_reference_tool() {
        let config = Config::default();
        assert!((config.period - 300.0).abs() < f64::EPSILON);
        assert_eq!(config.progress_every, 100_000);
        assert!(!config.flush_trailing_bin);
        assert_eq!(config.malformed, MalformedPolicy::Abort);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concur.toml");
        std::fs::write(
            &path,
            "period = 60\nflush_trailing_bin = true\nmalformed = \"skip\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert!((config.period - 60.0).abs() < f64::EPSILON);
        assert!(config.flush_trailing_bin);
        assert_eq!(config.malformed, MalformedPolicy::Skip);
        assert_eq!(config.progress_every, 100_000);
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concur.toml");
        std::fs::write(&path, "malformed = \"ignore\"\n").unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }
}
