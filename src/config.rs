// SPDX-FileCopyrightText: 2025 Hong Minhee <https://hongminhee.org/>
// SPDX-License-Identifier: GPL-3.0-or-later
//! Configuration file support for the command line.
//!
//! This module loads `.linkcase.toml`, which sets the casing options and
//! which note files the CLI rewrites when none are given.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Options;

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".linkcase.toml";

/// Configuration for the `linkcase` command.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Make `\l` lowercase only the first word (default: false).
    pub lowercase_first_word_only: bool,

    /// Glob patterns for files to include (default: empty, meaning all files
    /// must be specified on command line).
    pub include: Vec<String>,

    /// Glob patterns for files to exclude (default: empty).
    pub exclude: Vec<String>,
}

impl Config {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Discover and load configuration by searching up the directory tree.
    ///
    /// Starting from `start_dir`, searches for `.linkcase.toml` in each parent
    /// directory until the filesystem root is reached. Returns `None` if no
    /// configuration file is found.
    pub fn discover(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                tracing::debug!(path = %config_path.display(), "loaded configuration");
                return Ok(Some((config_path, config)));
            }
            if !current.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// The engine options this configuration selects.
    pub fn options(&self) -> Options {
        Options {
            lowercase_first_word_only: self.lowercase_first_word_only,
        }
    }

    /// Collect files matching the include patterns, excluding those matching
    /// exclude patterns.
    ///
    /// The `base_dir` is used as the starting point for glob pattern matching.
    /// Returns an empty list if no include patterns are configured.
    pub fn collect_files(&self, base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        use glob::{MatchOptions, glob_with};

        if self.include.is_empty() {
            return Ok(Vec::new());
        }

        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let mut files = Vec::new();
        for pattern in &self.include {
            let full_pattern = base_dir.join(pattern);
            let matches = glob_with(&full_pattern.to_string_lossy(), options)
                .map_err(|e| ConfigError::Glob(pattern.clone(), e))?;
            for entry in matches {
                let path = entry.map_err(ConfigError::GlobIo)?;
                if path.is_file() {
                    files.push(path);
                }
            }
        }

        files.sort();
        files.dedup();

        if !self.exclude.is_empty() {
            let exclude_patterns = self
                .exclude
                .iter()
                .map(|p| {
                    glob::Pattern::new(&base_dir.join(p).to_string_lossy())
                        .map_err(|e| ConfigError::Glob(p.clone(), e))
                })
                .collect::<Result<Vec<_>, _>>()?;

            files.retain(|path| {
                let path_str = path.to_string_lossy();
                !exclude_patterns
                    .iter()
                    .any(|pattern| pattern.matches(&path_str))
            });
        }

        Ok(files)
    }
}

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing a configuration file.
    #[error("failed to access {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    /// Error parsing the TOML configuration.
    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    /// Error reading or writing persisted JSON settings.
    #[error("invalid settings in {}: {}", .0.display(), .1)]
    Json(PathBuf, #[source] serde_json::Error),
    /// Error parsing a glob pattern.
    #[error("invalid glob pattern '{0}': {1}")]
    Glob(String, #[source] glob::PatternError),
    /// I/O error during glob iteration.
    #[error("error reading file: {0}")]
    GlobIo(#[from] glob::GlobError),
}
