//! Configuration file loading
//!
//! ```toml
//! interval_ms = 500
//!
//! [watch]
//! signature = "content"
//!
//! [watch.ignore]
//! skip_temp_files = true
//! ignore_file = ".watchignore"
//! patterns = ["*.tmp"]
//! ```
//!
//! Unknown keys at any level are rejected. Command-line flags override or
//! extend file values.

use anyhow::{Context, Result};
use pollwatch::{SignatureMode, WatchConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Poll interval used when neither the file nor the flags set one
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Poll interval in milliseconds
    #[serde(default)]
    pub interval_ms: Option<u64>,

    /// Signature mode and ignore rules (`[watch]` table)
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval_ms: Option<u64>,
    pub content: bool,
    pub skip_temp_files: bool,
    pub patterns: Vec<String>,
}

/// Effective settings for `pw watch`
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub interval: Duration,
    pub watch: WatchConfig,
}

/// Load a configuration file, or defaults when no path is given
pub fn load(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

fn parse(text: &str) -> Result<FileConfig> {
    Ok(toml::from_str(text)?)
}

impl FileConfig {
    /// Merge command-line overrides into the file values
    pub fn apply(self, overrides: Overrides) -> Result<Settings> {
        let interval_ms = overrides
            .interval_ms
            .or(self.interval_ms)
            .unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms == 0 {
            anyhow::bail!("Poll interval must be at least 1ms");
        }

        let mut watch = self.watch;
        if overrides.content {
            watch.signature = SignatureMode::Content;
        }
        if overrides.skip_temp_files {
            watch.ignore.skip_temp_files = true;
        }
        watch.ignore.patterns.extend(overrides.patterns);

        Ok(Settings {
            interval: Duration::from_millis(interval_ms),
            watch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = parse("").unwrap().apply(Overrides::default()).unwrap();

        assert_eq!(settings.interval, Duration::from_millis(DEFAULT_INTERVAL_MS));
        assert_eq!(settings.watch, WatchConfig::default());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
            interval_ms = 250

            [watch]
            signature = "content"

            [watch.ignore]
            skip_temp_files = true
            ignore_file = ".watchignore"
            patterns = ["*.tmp"]
            "#,
        )
        .unwrap();

        assert_eq!(config.interval_ms, Some(250));
        assert_eq!(config.watch.signature, SignatureMode::Content);
        assert!(config.watch.ignore.skip_temp_files);
        assert_eq!(config.watch.ignore.ignore_file, Some(PathBuf::from(".watchignore")));
        assert_eq!(config.watch.ignore.patterns, vec!["*.tmp"]);
    }

    #[test]
    fn test_flags_override_file() {
        let config = parse("interval_ms = 250\n[watch.ignore]\npatterns = [\"*.tmp\"]\n").unwrap();
        let settings = config
            .apply(Overrides {
                interval_ms: Some(10),
                content: true,
                skip_temp_files: true,
                patterns: vec!["*.part".to_string()],
            })
            .unwrap();

        assert_eq!(settings.interval, Duration::from_millis(10));
        assert_eq!(settings.watch.signature, SignatureMode::Content);
        assert!(settings.watch.ignore.skip_temp_files);
        assert_eq!(settings.watch.ignore.patterns, vec!["*.tmp", "*.part"]);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let overrides = Overrides {
            interval_ms: Some(0),
            ..Default::default()
        };
        assert!(FileConfig::default().apply(overrides).is_err());
    }

    #[test]
    fn test_bad_signature_mode_rejected() {
        assert!(parse("[watch]\nsignature = \"checksum\"").is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        for text in [
            "interval = 250",
            "signature = \"content\"",
            "[watch]\nsignatur = \"content\"",
            "[watch.ignore]\nskip_tmp_files = true",
        ] {
            assert!(parse(text).is_err(), "{:?} should be rejected", text);
        }
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
        assert_eq!(load(None).unwrap(), FileConfig::default());
    }
}
