// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! File layout under the `tt` base directory (default `~/.tt`).
//!
//! | Path | Contents |
//! |------|----------|
//! | `timer` | timer state, one line |
//! | `project` | name of the current project |
//! | `projects/<name>` | session records, one per line |
//! | `config` | TOML settings |
//! | `history` | obsolete flat session log (legacy layout only) |

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Environment variable that overrides the base directory.
pub const DIR_ENV: &str = "TT_DIR";
const DEFAULT_DIR: &str = ".tt";

#[derive(Clone, Debug)]
pub struct Paths {
    base: PathBuf,
}

impl Paths {
    pub fn with_base(base: PathBuf) -> Self {
        Paths { base }
    }

    /// `--dir` if given, else `$TT_DIR`, else `~/.tt` (or `./.tt` without a home directory).
    pub fn resolve(dir: Option<PathBuf>) -> Self {
        let base = dir
            .or_else(|| env::var_os(DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(DEFAULT_DIR)
            });
        Paths { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn timer(&self) -> PathBuf {
        self.base.join("timer")
    }

    pub fn project(&self) -> PathBuf {
        self.base.join("project")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.base.join("projects")
    }

    pub fn project_log(&self, name: &str) -> PathBuf {
        self.projects_dir().join(name)
    }

    pub fn config(&self) -> PathBuf {
        self.base.join("config")
    }

    pub fn legacy_history(&self) -> PathBuf {
        self.base.join("history")
    }
}

/// Replaces `path` wholesale: writes a temp file in the same directory, then renames it over `path`.
pub fn replace_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(p: &str) -> PathBuf {
    match (p.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(p),
    }
}
