// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! Project store: one append-only session log per project, plus the current-project pointer.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::paths::{replace_file, Paths};
use crate::record::SessionRecord;

/// Project used when no pointer exists yet, and the target of legacy migration.
pub const DEFAULT_PROJECT: &str = "default";

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"))
}

/// Checks a new project name against `^[A-Za-z_][A-Za-z0-9_]*$`.
pub fn validate_name(name: &str) -> Result<()> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

/// Checks that `name` names a file directly inside `projects/`. Existing logs with
/// names outside the new-name pattern pass; `..`, separators and absolute paths do not.
pub fn validate_store_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c.to_str() == Some(name) && !name.contains(['/', '\\']) => Ok(()),
        _ => Err(Error::InvalidName(name.to_string())),
    }
}

#[derive(Clone, Debug)]
pub struct ProjectStore {
    paths: Paths,
}

impl ProjectStore {
    pub fn new(paths: Paths) -> Self {
        ProjectStore { paths }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.paths.project_log(name).is_file()
    }

    /// Creates an empty log for `name` if it has none.
    pub fn create(&self, name: &str) -> Result<()> {
        fs::create_dir_all(self.paths.projects_dir())?;
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.project_log(name))?;
        Ok(())
    }

    /// Decodes every record for `name`. A missing log is an empty project; a malformed line is an error.
    pub fn load(&self, name: &str) -> Result<Vec<SessionRecord>> {
        let content = match fs::read_to_string(self.paths.project_log(name)) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = SessionRecord::decode(line).map_err(|reason| Error::CorruptRecord {
                project: name.to_string(),
                line: i + 1,
                reason,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Appends encoded records to `name`'s log, creating it if absent.
    pub fn append(&self, name: &str, records: &[SessionRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.paths.projects_dir())?;
        let mut out = String::new();
        for r in records {
            out.push_str(&r.encode());
            out.push('\n');
        }
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.project_log(name))?;
        f.write_all(out.as_bytes())?;
        Ok(())
    }

    /// Name in the `project` pointer file, or [`DEFAULT_PROJECT`] when there is none.
    pub fn current(&self) -> Result<String> {
        match fs::read_to_string(self.paths.project()) {
            Ok(c) => {
                let name = c.trim();
                let name = if name.is_empty() { DEFAULT_PROJECT } else { name };
                validate_store_name(name).map_err(|_| {
                    Error::CorruptState(format!("project pointer names \"{}\", which is not a project", name))
                })?;
                Ok(name.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(DEFAULT_PROJECT.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_current(&self, name: &str) -> Result<()> {
        replace_file(&self.paths.project(), &format!("{}\n", name))?;
        Ok(())
    }
}
