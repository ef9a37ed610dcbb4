// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! User settings from `<base>/config` (TOML).
//!
//! ```toml
//! editor = "nvim"
//! repositories = ["~/src/app", "/work/lib"]
//!
//! [aliases]
//! s = "status --raw"
//! ```
//!
//! Every key is optional. A missing, unreadable or invalid file falls back to defaults.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::paths::expand_home;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub editor: Option<String>,
    pub aliases: BTreeMap<String, String>,
    pub repositories: Vec<String>,
}

impl Config {
    /// Loads `path`, logging [`Error::MissingConfig`] and returning defaults when it cannot be used.
    pub fn load(path: &Path) -> Config {
        match Self::try_load(path) {
            Ok(c) => c,
            Err(e) => {
                match &e {
                    Error::MissingConfig { reason, .. } if reason == "not found" => {
                        tracing::debug!("{}; using defaults", e);
                    }
                    _ => tracing::warn!("{}; using defaults", e),
                }
                Config::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Config, Error> {
        let missing = |reason: String| Error::MissingConfig {
            path: path.to_path_buf(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                missing("not found".to_string())
            } else {
                missing(e.to_string())
            }
        })?;
        toml::from_str(&content).map_err(|e| missing(e.to_string().trim().to_string()))
    }

    /// Editor command: config, then `$VISUAL`, then `$EDITOR`, then `vi`.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| env::var("VISUAL").ok().filter(|e| !e.trim().is_empty()))
            .or_else(|| env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn repository_paths(&self) -> Vec<PathBuf> {
        self.repositories.iter().map(|r| expand_home(r)).collect()
    }

    /// Words an alias expands to, or `None` if `name` is not an alias.
    pub fn expand_alias(&self, name: &str) -> Option<Vec<String>> {
        let words: Vec<String> = self
            .aliases
            .get(name)?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        (!words.is_empty()).then_some(words)
    }
}
