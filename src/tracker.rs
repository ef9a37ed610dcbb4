// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! Per-invocation context.
//!
//! [`Tracker::load`] reads the timer and the current project when the process
//! starts. Commands mutate the in-memory copy only; [`Tracker::finish`] writes
//! everything once at the end of a successful run. An error before then leaves the
//! files exactly as they were.
//!
//! Concurrent invocations against one base directory are not supported: there is no
//! locking, and the last writer wins.

use std::fs;
use std::io;

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::elapsed::Elapsed;
use crate::error::Result;
use crate::paths::{replace_file, Paths};
use crate::project::{validate_name, validate_store_name, ProjectStore};
use crate::record::{RepoCommits, SessionRecord};
use crate::timer::{PauseOutcome, Timer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// One line per session without commits.
    pub short: bool,
    /// Append the cumulative total.
    pub sum: bool,
}

#[derive(Debug)]
pub struct Tracker {
    paths: Paths,
    store: ProjectStore,
    timer: Timer,
    timer_dirty: bool,
    current: String,
    current_dirty: bool,
    created: Vec<String>,
    /// Finished sessions and the project each belongs to.
    pending: Vec<(String, SessionRecord)>,
}

impl Tracker {
    pub fn load(paths: Paths) -> Result<Self> {
        let timer = match fs::read_to_string(paths.timer()) {
            Ok(c) => Timer::decode(&c)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Timer::Stopped,
            Err(e) => return Err(e.into()),
        };
        let store = ProjectStore::new(paths.clone());
        let current = store.current()?;
        Ok(Tracker {
            paths,
            store,
            timer,
            timer_dirty: false,
            current,
            current_dirty: false,
            created: Vec::new(),
            pending: Vec::new(),
        })
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn current_project(&self) -> &str {
        &self.current
    }

    pub fn start(&mut self, now: i64) -> Result<()> {
        self.timer.start(now)?;
        self.timer_dirty = true;
        Ok(())
    }

    pub fn pause(&mut self, now: i64) -> Result<PauseOutcome> {
        let outcome = self.timer.pause(now)?;
        if outcome == PauseOutcome::Paused {
            self.timer_dirty = true;
        }
        Ok(outcome)
    }

    pub fn resume(&mut self, now: i64) -> Result<()> {
        self.timer.resume(now)?;
        self.timer_dirty = true;
        Ok(())
    }

    /// Stops the timer and queues the finished session for the current project.
    pub fn stop(&mut self, now: i64, title: &str, commits: Vec<RepoCommits>) -> Result<&SessionRecord> {
        let duration = self.timer.stop(now, title)?;
        self.timer_dirty = true;
        let record = SessionRecord::new(local_datetime(now), duration, title, commits);
        tracing::debug!(project = %self.current, line = %record.encode(), "session queued");
        self.pending.push((self.current.clone(), record));
        let (_, record) = &self.pending[self.pending.len() - 1];
        Ok(record)
    }

    /// Makes `name` current, creating an empty project if it is new. Returns true if it was created.
    pub fn switch_to(&mut self, name: &str) -> Result<bool> {
        validate_store_name(name)?;
        let is_new = !self.store.exists(name) && !self.created.iter().any(|c| c == name);
        if is_new {
            validate_name(name)?;
            self.created.push(name.to_string());
        }
        self.current = name.to_string();
        self.current_dirty = true;
        Ok(is_new)
    }

    /// Records of the current project, including ones queued in this run.
    pub fn records(&self) -> Result<Vec<SessionRecord>> {
        let mut records = self.store.load(&self.current)?;
        records.extend(
            self.pending
                .iter()
                .filter(|(project, _)| *project == self.current)
                .map(|(_, r)| r.clone()),
        );
        Ok(records)
    }

    /// Formatted listing of the current project's sessions.
    pub fn list_current(&self, opts: ListOptions) -> Result<Vec<String>> {
        Ok(render_list(&self.records()?, opts))
    }

    /// Writes queued changes: new projects, appended sessions, project pointer, then timer.
    pub fn finish(self) -> Result<()> {
        for name in &self.created {
            self.store.create(name)?;
        }
        for (project, record) in &self.pending {
            self.store.append(project, std::slice::from_ref(record))?;
        }
        if self.current_dirty {
            self.store.set_current(&self.current)?;
        }
        if self.timer_dirty {
            replace_file(&self.paths.timer(), &format!("{}\n", self.timer.encode()))?;
        }
        Ok(())
    }
}

fn local_datetime(epoch: i64) -> NaiveDateTime {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .unwrap_or_else(Local::now)
        .naive_local()
}

/// Renders records in full form (date, duration, title, commits) or short form, plus an optional total.
pub fn render_list(records: &[SessionRecord], opts: ListOptions) -> Vec<String> {
    let mut out = Vec::new();
    for r in records {
        if opts.short {
            out.push(format!("{}  {}", r.duration, r.title));
            continue;
        }
        out.push(format!(
            "{}  {}  {}",
            r.ended_at.format("%Y-%m-%d %H:%M"),
            r.duration,
            r.title
        ));
        for repo in &r.commits {
            let label = if repo.repo.is_empty() { "(repository)" } else { repo.repo.as_str() };
            out.push(format!("    {}", label));
            for c in &repo.commits {
                out.push(format!("      {}", c));
            }
        }
    }
    if opts.sum {
        let total: Elapsed = records.iter().map(|r| r.duration).sum();
        out.push(format!("Total: {}", total.summary()));
    }
    out
}
