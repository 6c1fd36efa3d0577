//! Filename filters applied during capture
//!
//! Supports three optional sources, all off by default so a plain watch
//! reports every regular file:
//! 1. Built-in editor and OS temporary-file patterns
//! 2. A gitignore-syntax ignore file
//! 3. Config-based gitignore-syntax patterns

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compiled ignore rules for one watched directory
#[derive(Debug)]
pub struct IgnoreRules {
    /// Patterns from the ignore file and config, compiled together
    matcher: Option<Gitignore>,

    /// Configuration
    config: IgnoreConfig,
}

impl IgnoreRules {
    /// Compile ignore rules for `dir`
    ///
    /// A relative `ignore_file` is resolved against `dir`. A missing or
    /// unparsable ignore file, or an invalid pattern, is an error.
    pub fn load(dir: &Path, config: IgnoreConfig) -> Result<Self, ignore::Error> {
        let matcher = if config.ignore_file.is_none() && config.patterns.is_empty() {
            None
        } else {
            let mut builder = GitignoreBuilder::new(dir);

            if let Some(ref ignore_file) = config.ignore_file {
                let path = if ignore_file.is_absolute() {
                    ignore_file.clone()
                } else {
                    dir.join(ignore_file)
                };
                if let Some(err) = builder.add(&path) {
                    return Err(err);
                }
            }

            for pattern in &config.patterns {
                builder.add_line(None, pattern)?;
            }

            Some(builder.build()?)
        };

        Ok(Self { matcher, config })
    }

    /// Check if a filename should be left out of snapshots
    pub fn should_ignore(&self, name: &str) -> bool {
        if self.config.skip_temp_files && is_temp_file(name) {
            return true;
        }

        if let Some(ref matcher) = self.matcher {
            // Only plain files are ever matched; directories never reach here
            if matcher.matched(Path::new(name), false).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Get number of active ignore sources
    pub fn active_sources(&self) -> usize {
        let mut count = 0;
        if self.config.skip_temp_files {
            count += 1;
        }
        if self.config.ignore_file.is_some() {
            count += 1;
        }
        if !self.config.patterns.is_empty() {
            count += 1;
        }
        count
    }
}

/// Common editor swap/backup files, OS metadata files and bytecode
fn is_temp_file(name: &str) -> bool {
    // Vim swap files
    if name.ends_with(".swp") || name.ends_with(".swo") || name.ends_with(".swn") || name.ends_with(".swm") {
        return true;
    }

    // Vim/Emacs backups, Emacs auto-save and lock files
    if name.ends_with('~') || (name.len() > 1 && name.starts_with('#') && name.ends_with('#')) || name.starts_with(".#") {
        return true;
    }

    // MacOS and Windows system files
    if name == ".DS_Store" || name.starts_with("._") || name == "Thumbs.db" || name == "desktop.ini" {
        return true;
    }

    // Python bytecode
    name.ends_with(".pyc")
}

/// Ignore configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreConfig {
    /// Skip editor/OS temporary files (default: false)
    #[serde(default)]
    pub skip_temp_files: bool,

    /// Gitignore-syntax file, relative to the watched directory or absolute
    #[serde(default)]
    pub ignore_file: Option<PathBuf>,

    /// Additional gitignore-syntax patterns
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_ignores_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let rules = IgnoreRules::load(temp_dir.path(), IgnoreConfig::default()).unwrap();

        assert!(!rules.should_ignore("file.swp"));
        assert!(!rules.should_ignore(".DS_Store"));
        assert!(!rules.should_ignore("seastorm.log"));
        assert_eq!(rules.active_sources(), 0);
    }

    #[test]
    fn test_temp_file_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            skip_temp_files: true,
            ..Default::default()
        };
        let rules = IgnoreRules::load(temp_dir.path(), config).unwrap();

        for name in ["a.swp", "notes.txt~", "#draft#", ".#lock", ".DS_Store", "._x", "Thumbs.db", "mod.pyc"] {
            assert!(rules.should_ignore(name), "{} should be ignored", name);
        }
        for name in ["result.txt", "#", "seastorm.log", "swp"] {
            assert!(!rules.should_ignore(name), "{} should be kept", name);
        }
    }

    #[test]
    fn test_config_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            patterns: vec!["*.tmp".to_string(), "partial-*".to_string()],
            ..Default::default()
        };
        let rules = IgnoreRules::load(temp_dir.path(), config).unwrap();

        assert!(rules.should_ignore("upload.tmp"));
        assert!(rules.should_ignore("partial-0001"));
        assert!(!rules.should_ignore("final.log"));
        assert_eq!(rules.active_sources(), 1);
    }

    #[test]
    fn test_ignore_file_with_negation() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".watchignore"), "*.log\n!keep.log\n").unwrap();

        let config = IgnoreConfig {
            ignore_file: Some(PathBuf::from(".watchignore")),
            ..Default::default()
        };
        let rules = IgnoreRules::load(temp_dir.path(), config).unwrap();

        assert!(rules.should_ignore("debug.log"));
        assert!(!rules.should_ignore("keep.log"));
        assert!(!rules.should_ignore("output.txt"));
    }

    #[test]
    fn test_missing_ignore_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = IgnoreConfig {
            ignore_file: Some(PathBuf::from("does-not-exist")),
            ..Default::default()
        };

        assert!(IgnoreRules::load(temp_dir.path(), config).is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: IgnoreConfig = toml::from_str("patterns = [\"*.tmp\"]").unwrap();

        assert!(!config.skip_temp_files);
        assert!(config.ignore_file.is_none());
        assert_eq!(config.patterns, vec!["*.tmp"]);
    }

    #[test]
    fn test_config_rejects_misspelled_keys() {
        let err = toml::from_str::<IgnoreConfig>("skip_tmp_files = true").unwrap_err();
        assert!(err.to_string().contains("skip_tmp_files"));
    }
}
