// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! One-time upgrade from the legacy on-disk layout.
//!
//! The older layout kept every session in one flat `history` file and wrote the
//! timer state with fewer than four fields. Upgrading resets the timer to
//! `stopped:0:0:0`, moves `history` to `projects/default`, and points `project` at
//! `default` if no project was selected. The user is asked first; a refusal stops
//! the invocation before any command runs.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use crate::error::{Error, Result};
use crate::paths::{replace_file, Paths};
use crate::project::DEFAULT_PROJECT;
use crate::prompt::{confirm, Prompt};
use crate::timer::{is_legacy_encoding, Timer};

/// What was found of the legacy layout.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Legacy {
    /// Contents of a short-form `timer` file, if any.
    pub timer: Option<String>,
    pub has_history: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Current,
    Migrated,
}

pub fn detect(paths: &Paths) -> Result<Option<Legacy>> {
    let timer = match fs::read_to_string(paths.timer()) {
        Ok(c) if is_legacy_encoding(&c) => Some(c.trim().to_string()),
        Ok(_) => None,
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    let has_history = paths.legacy_history().is_file();
    if timer.is_none() && !has_history {
        return Ok(None);
    }
    Ok(Some(Legacy { timer, has_history }))
}

/// Migrates if needed, asking through `prompt` first.
pub fn run(paths: &Paths, prompt: &mut dyn Prompt) -> Result<Outcome> {
    let legacy = match detect(paths)? {
        Some(l) => l,
        None => return Ok(Outcome::Current),
    };
    tracing::debug!(?legacy, "legacy layout detected");
    let question = format!("Migrate legacy tt data in {}?", paths.base().display());
    if !confirm(prompt, &question)? {
        return Err(Error::MigrationDeclined);
    }
    apply(paths, &legacy)?;
    Ok(Outcome::Migrated)
}

fn apply(paths: &Paths, legacy: &Legacy) -> Result<()> {
    if let Some(old) = &legacy.timer {
        if !old.starts_with("stopped") {
            tracing::warn!(old = %old, "legacy timer was not stopped; its session is discarded");
        }
        replace_file(&paths.timer(), &format!("{}\n", Timer::Stopped.encode()))?;
    }
    if legacy.has_history {
        let dest = paths.project_log(DEFAULT_PROJECT);
        fs::create_dir_all(paths.projects_dir())?;
        if dest.exists() {
            let mut history = fs::read_to_string(paths.legacy_history())?;
            if !history.is_empty() && !history.ends_with('\n') {
                history.push('\n');
            }
            let mut f = OpenOptions::new().append(true).open(&dest)?;
            f.write_all(history.as_bytes())?;
            fs::remove_file(paths.legacy_history())?;
        } else {
            fs::rename(paths.legacy_history(), &dest)?;
        }
        println!("Moved {} to {}", paths.legacy_history().display(), dest.display());
    }
    if !paths.project().exists() {
        replace_file(&paths.project(), &format!("{}\n", DEFAULT_PROJECT))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::tests::Scripted;

    fn setup() -> (tempfile::TempDir, Paths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(dir.path().to_path_buf());
        (dir, paths)
    }

    #[test]
    fn test_fresh_install_is_current() {
        let (_dir, paths) = setup();
        let mut p = Scripted::new(&[]);
        assert_eq!(run(&paths, &mut p).unwrap(), Outcome::Current);
        assert!(p.asked.is_empty());
    }

    #[test]
    fn test_current_layout_is_left_alone() {
        let (_dir, paths) = setup();
        fs::write(paths.timer(), "running:100:0:0\n").unwrap();
        assert_eq!(detect(&paths).unwrap(), None);
    }

    #[test]
    fn test_three_field_timer_and_history_migrate() {
        let (_dir, paths) = setup();
        fs::write(paths.timer(), "stopped:0:0\n").unwrap();
        fs::write(
            paths.legacy_history(),
            "2019-03-04/18:22:10 01:10:05 fixed parser || a1 x\n",
        )
        .unwrap();
        let mut p = Scripted::new(&["y"]);
        assert_eq!(run(&paths, &mut p).unwrap(), Outcome::Migrated);
        assert_eq!(fs::read_to_string(paths.timer()).unwrap().trim(), "stopped:0:0:0");
        assert!(!paths.legacy_history().exists());
        let moved = fs::read_to_string(paths.project_log("default")).unwrap();
        assert!(moved.starts_with("2019-03-04/18:22:10 01:10:05 fixed parser"));
        assert_eq!(fs::read_to_string(paths.project()).unwrap().trim(), "default");
        assert_eq!(detect(&paths).unwrap(), None);
    }

    #[test]
    fn test_running_legacy_timer_is_reset() {
        let (_dir, paths) = setup();
        fs::write(paths.timer(), "running:1700000000:0").unwrap();
        let mut p = Scripted::new(&["yes"]);
        run(&paths, &mut p).unwrap();
        assert_eq!(fs::read_to_string(paths.timer()).unwrap().trim(), "stopped:0:0:0");
    }

    #[test]
    fn test_history_appends_to_existing_default() {
        let (_dir, paths) = setup();
        fs::create_dir_all(paths.projects_dir()).unwrap();
        fs::write(paths.project_log("default"), "2024-01-01/00:00:00 00:01:00 new\n").unwrap();
        fs::write(paths.legacy_history(), "2019-01-01/00:00:00 00:02:00 old").unwrap();
        fs::write(paths.project(), "work\n").unwrap();
        let mut p = Scripted::new(&["y"]);
        run(&paths, &mut p).unwrap();
        let lines: Vec<String> = fs::read_to_string(paths.project_log("default"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("old"));
        assert_eq!(fs::read_to_string(paths.project()).unwrap().trim(), "work");
    }

    #[test]
    fn test_refusal_touches_nothing() {
        let (_dir, paths) = setup();
        fs::write(paths.timer(), "stopped:0:0").unwrap();
        fs::write(paths.legacy_history(), "x").unwrap();
        let mut p = Scripted::new(&["n"]);
        assert!(matches!(run(&paths, &mut p), Err(Error::MigrationDeclined)));
        assert_eq!(fs::read_to_string(paths.timer()).unwrap(), "stopped:0:0");
        assert!(paths.legacy_history().exists());
        assert!(!paths.projects_dir().exists());
        assert!(!paths.project().exists());
    }
}
