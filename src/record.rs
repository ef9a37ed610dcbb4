// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! # Session record codec
//!
//! One completed session per line:
//!
//! - `YYYY-MM-DD/HH:MM:SS HH:MM:SS title[commit-block]`
//!
//! The first token is the end date/time, the second the net duration, and the rest
//! of the line is the title followed by an optional commit block:
//!
//! - ` >> /path/to/repo || abc1234 first commit || def5678 second commit`
//!
//! one ` >> ` group per repository, repeated back to back. Older logs carried a
//! single unlabelled repository written straight after the title:
//!
//! - `title || abc1234 first commit || def5678 second commit`
//!
//! which decodes as one repository with an empty path. When a hand-written title
//! contains ` >> ` or ` || `, the first occurrence is taken as the start of the commit
//! block. Records built with [`SessionRecord::new`] never contain a stray separator:
//! a free-standing `>>` or `||` word is joined to its neighbour.

use chrono::NaiveDateTime;

use crate::elapsed::Elapsed;

pub const REPO_SEP: &str = " >> ";
pub const COMMIT_SEP: &str = " || ";
pub const END_FORMAT: &str = "%Y-%m-%d/%H:%M:%S";

/// Commits found in one repository during a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoCommits {
    /// Repository path; empty for records decoded from the legacy layout.
    pub repo: String,
    pub commits: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    pub ended_at: NaiveDateTime,
    pub duration: Elapsed,
    pub title: String,
    pub commits: Vec<RepoCommits>,
}

impl SessionRecord {
    /// Builds a record, dropping repositories without commits and flattening every field to one
    /// line free of separator tokens.
    pub fn new(
        ended_at: NaiveDateTime,
        duration: Elapsed,
        title: &str,
        commits: Vec<RepoCommits>,
    ) -> Self {
        let commits = commits
            .into_iter()
            .map(|r| RepoCommits {
                repo: field(&r.repo),
                commits: r.commits.iter().map(|c| field(c)).filter(|c| !c.is_empty()).collect(),
            })
            .filter(|r| !r.commits.is_empty())
            .collect();
        SessionRecord {
            ended_at,
            duration,
            title: field(title),
            commits,
        }
    }

    pub fn encode(&self) -> String {
        let mut line = format!(
            "{} {} {}",
            self.ended_at.format(END_FORMAT),
            self.duration,
            self.title
        );
        for repo in self.commits.iter().filter(|r| !r.commits.is_empty()) {
            line.push_str(REPO_SEP);
            line.push_str(&one_line(&repo.repo));
            for commit in &repo.commits {
                line.push_str(COMMIT_SEP);
                line.push_str(&one_line(commit));
            }
        }
        line
    }

    /// Decodes one log line; the error string says which part is malformed.
    pub fn decode(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(3, ' ');
        let (end, duration, rest) = match (parts.next(), parts.next(), parts.next()) {
            (Some(e), Some(d), Some(r)) => (e, d, r),
            _ => return Err(format!("expected \"<end> <duration> <title>\", got \"{}\"", line)),
        };
        let ended_at = NaiveDateTime::parse_from_str(end, END_FORMAT)
            .map_err(|_| format!("bad end time \"{}\"", end))?;
        let duration = Elapsed::parse_hms(duration).ok_or_else(|| format!("bad duration \"{}\"", duration))?;
        let (title, commits) = split_commit_block(rest);
        if title.trim().is_empty() {
            return Err("empty title".to_string());
        }
        Ok(SessionRecord {
            ended_at,
            duration,
            title: title.to_string(),
            commits,
        })
    }
}

/// Splits `title[commit-block]`: current layout first, then the legacy one, then plain title.
fn split_commit_block(rest: &str) -> (&str, Vec<RepoCommits>) {
    if let Some((title, block)) = rest.split_once(REPO_SEP) {
        let commits = block
            .split(REPO_SEP)
            .filter_map(|group| {
                let mut fields = group.split(COMMIT_SEP);
                let repo = fields.next()?.to_string();
                let commits: Vec<String> = fields.map(str::to_string).collect();
                (!commits.is_empty()).then_some(RepoCommits { repo, commits })
            })
            .collect();
        return (title, commits);
    }
    if let Some((title, block)) = rest.split_once(COMMIT_SEP) {
        let commits = block.split(COMMIT_SEP).map(str::to_string).collect();
        return (
            title,
            vec![RepoCommits {
                repo: String::new(),
                commits,
            }],
        );
    }
    (rest, Vec::new())
}

/// Collapses whitespace and glues each free-standing `>>` or `||` onto a neighbouring word.
fn field(s: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut leading = String::new();
    for w in s.split_whitespace() {
        if w == ">>" || w == "||" {
            match words.last_mut() {
                Some(prev) => prev.push_str(w),
                None => leading.push_str(w),
            }
        } else {
            words.push(format!("{}{}", std::mem::take(&mut leading), w));
        }
    }
    if words.is_empty() && !leading.is_empty() {
        // Nothing but separators.
        words.push(leading[..1].to_string());
    }
    words.join(" ")
}

fn one_line(s: &str) -> String {
    s.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}
