// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! Commits made during a session, read with `git log`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::record::RepoCommits;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub summary: String,
}

/// Commits in `repo` since `since` (Unix epoch), newest first.
pub fn list_commits_since(repo: &Path, since: i64) -> Result<Vec<Commit>> {
    if !repo.is_dir() {
        return Err(Error::Git(format!("{}: no such directory", repo.display())));
    }
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .arg("log")
        .arg(format!("--since=@{}", since))
        .arg("--format=%h %s")
        .output()
        .map_err(|e| Error::Git(format!("{}: {}", repo.display(), e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(format!("{}: {}", repo.display(), stderr.trim())));
    }
    Ok(parse_log(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_log(stdout: &str) -> Vec<Commit> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| match l.split_once(' ') {
            Some((id, summary)) => Commit {
                id: id.to_string(),
                summary: summary.to_string(),
            },
            None => Commit {
                id: l.to_string(),
                summary: String::new(),
            },
        })
        .collect()
}

/// Commit annotations for a session. Unreadable repositories are logged and skipped.
pub fn collect_annotations(repos: &[PathBuf], since: i64) -> Vec<RepoCommits> {
    let mut out = Vec::new();
    for repo in repos {
        match list_commits_since(repo, since) {
            Ok(commits) if commits.is_empty() => {
                tracing::debug!(repo = %repo.display(), "no commits during session");
            }
            Ok(commits) => out.push(RepoCommits {
                repo: repo.display().to_string(),
                commits: commits
                    .into_iter()
                    .map(|c| format!("{} {}", c.id, c.summary).trim_end().to_string())
                    .collect(),
            }),
            Err(e) => tracing::warn!("{}; skipping repository", e),
        }
    }
    out
}
