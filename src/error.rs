// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! Error type shared by every `tt` command.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tt {action}: timer is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("tt stop: empty title; timer not stopped")]
    EmptyTitle,

    #[error("tt switch: invalid project name \"{0}\" (use letters, digits and _; no leading digit)")]
    InvalidName(String),

    #[error("tt list: project {project}, line {line}: {reason}")]
    CorruptRecord {
        project: String,
        line: usize,
        reason: String,
    },

    #[error("tt: corrupt timer state: {0}")]
    CorruptState(String),

    #[error("tt: legacy data not migrated; nothing done")]
    MigrationDeclined,

    #[error("tt: config {}: {reason}", path.display())]
    MissingConfig { path: PathBuf, reason: String },

    #[error("tt: editor: {0}")]
    Editor(String),

    #[error("tt: git: {0}")]
    Git(String),

    #[error("tt update: {0}")]
    Update(String),

    #[error("tt: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
