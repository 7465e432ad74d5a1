//! The optional `config.toml` holding a user's usual folders and tolerances.
//!
//! It lives at `~/.config/backup-planner/config.toml` on Linux (see
//! [`FileConfig::config_path`] for other platforms). A value given on the
//! command line beats the file, and the file beats the built-in default.
//!
//! # Example
//!
//! ```toml
//! # Folders used by `scan` and `fit` when none are passed on the command line
//! folders = ["~/Projects/feature_a", "~/Projects/feature_b"]
//!
//! [compare]
//! size_threshold = "2000"
//! file_count_threshold = 0
//! keep_going = false
//!
//! [fit]
//! capacity_tb = 4.0
//! safety_margin_percent = 10.0
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Parsed contents of `config.toml`.
///
/// Every value is optional; an absent key falls through to the built-in
/// default when options are resolved.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Default folders for `scan` and `fit`
    pub folders: Option<Vec<PathBuf>>,

    /// Comparison options
    #[serde(default)]
    pub compare: FileCompareConfig,

    /// Fitting options
    #[serde(default)]
    pub fit: FileFitConfig,
}

/// Comparison options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileCompareConfig {
    /// Maximum byte-size delta, as a size string (e.g. `"2000"`, `"4KiB"`)
    pub size_threshold: Option<String>,

    /// Maximum file-count delta
    pub file_count_threshold: Option<u64>,

    /// Keep comparing remaining pairs after one fails
    pub keep_going: Option<bool>,
}

/// Fitting options from the configuration file.
#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct FileFitConfig {
    /// Target drive capacity in TB (TiB, 2^40 bytes)
    pub capacity_tb: Option<f64>,

    /// Percentage of the drive kept free
    pub safety_margin_percent: Option<f64>,
}

/// Expand a leading `~` in a path to the user's home directory.
///
/// Paths that don't start with `~` are returned unchanged.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

impl FileConfig {
    /// Returns the path where the configuration file is expected.
    ///
    /// `<config_dir>/backup-planner/config.toml`, where `<config_dir>` is the
    /// platform configuration directory (`~/.config` on Linux, `%APPDATA%` on
    /// Windows). `None` if that directory cannot be determined.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("backup-planner").join("config.toml"))
    }

    /// Load configuration from the default config file location.
    ///
    /// A missing file yields the default (empty) configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, contains
    /// invalid TOML, or has unknown keys.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("no config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file at {}: {e}", path.display())
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file at {}: {e}", path.display())
        })?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Default folders with `~` expanded, or an empty list.
    #[must_use]
    pub fn folders(&self) -> Vec<PathBuf> {
        self.folders
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| expand_tilde(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_file_config() {
        let config = FileConfig::default();

        assert!(config.folders.is_none());
        assert!(config.compare.size_threshold.is_none());
        assert!(config.compare.file_count_threshold.is_none());
        assert!(config.compare.keep_going.is_none());
        assert!(config.fit.capacity_tb.is_none());
        assert!(config.fit.safety_margin_percent.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
folders = ["/data/a", "~/b"]

[compare]
size_threshold = "4KiB"
file_count_threshold = 2
keep_going = true

[fit]
capacity_tb = 2.5
safety_margin_percent = 5.0
"#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(
            config.folders,
            Some(vec![PathBuf::from("/data/a"), PathBuf::from("~/b")])
        );
        assert_eq!(config.compare.size_threshold, Some("4KiB".to_string()));
        assert_eq!(config.compare.file_count_threshold, Some(2));
        assert_eq!(config.compare.keep_going, Some(true));
        assert_eq!(config.fit.capacity_tb, Some(2.5));
        assert_eq!(config.fit.safety_margin_percent, Some(5.0));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r"
[fit]
capacity_tb = 8.0
";

        let config: FileConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.fit.capacity_tb, Some(8.0));
        assert!(config.fit.safety_margin_percent.is_none());
        assert!(config.compare.size_threshold.is_none());
        assert!(config.folders.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: FileConfig = toml::from_str("").unwrap();

        assert!(config.folders.is_none());
        assert!(config.fit.capacity_tb.is_none());
    }

    #[test]
    fn test_malformed_config_errors() {
        let toml_content = r#"
[compare]
file_count_threshold = "lots"
"#;
        assert!(toml::from_str::<FileConfig>(toml_content).is_err());
    }

    #[test]
    fn test_unknown_key_errors() {
        let toml_content = r"
[fit]
capacity = 1.0
";
        assert!(toml::from_str::<FileConfig>(toml_content).is_err());
    }

    #[test]
    fn test_config_path_returns_expected_suffix() {
        if let Some(p) = FileConfig::config_path() {
            assert!(p.ends_with(Path::new("backup-planner").join("config.toml")));
        }
    }

    #[test]
    fn test_load_from_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = FileConfig::load_from(&tmp.path().join("nope.toml")).unwrap();
        assert!(config.folders.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[compare]\nfile_count_threshold = 3\n").unwrap();

        let config = FileConfig::load_from(&path).unwrap();

        assert_eq!(config.compare.file_count_threshold, Some(3));
    }

    #[test]
    fn test_load_from_invalid_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let err = FileConfig::load_from(&path).unwrap_err();

        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_folders_expands_tilde() {
        let config: FileConfig = toml::from_str(r#"folders = ["~/Films", "/abs"]"#).unwrap();
        let folders = config.folders();

        assert_eq!(folders.len(), 2);
        assert_eq!(folders[1], PathBuf::from("/abs"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(folders[0], home.join("Films"));
        }
    }

    #[test]
    fn test_expand_tilde_absolute_path_unchanged() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(expand_tilde(&path), path);
    }

    #[test]
    fn test_expand_tilde_bare() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~")), home);
        }
    }
}
