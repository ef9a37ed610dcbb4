// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! # Timer state machine
//!
//! ```text
//!            start                pause
//! Stopped ─────────► Running ─────────► Paused
//!    ▲                │  ▲                 │
//!    │      stop      │  └──── resume ─────┤
//!    └────────────────┴────────── stop ────┘
//! ```
//!
//! ## State file
//!
//! One line, four colon-separated fields:
//!
//! - `status:startEpoch:lastPauseEpoch:pausedAccumulatedSeconds`
//!
//! `status` is `stopped`, `running` or `paused`. Fields that mean nothing for the
//! status are written as `0`, so a stopped timer is `stopped:0:0:0`.

use crate::elapsed::Elapsed;
use crate::error::{Error, Result};

/// Number of fields in the current state-file layout. Older files carry fewer.
pub const STATE_FIELDS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Timer {
    #[default]
    Stopped,
    Running {
        started_at: i64,
        paused_secs: u64,
    },
    Paused {
        started_at: i64,
        paused_secs: u64,
        paused_at: i64,
    },
}

/// Result of `pause`; pausing an already paused timer is only a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseOutcome {
    Paused,
    AlreadyPaused,
}

impl Timer {
    pub fn status(&self) -> &'static str {
        match self {
            Timer::Stopped => "stopped",
            Timer::Running { .. } => "running",
            Timer::Paused { .. } => "paused",
        }
    }

    /// Start epoch of the current session, if any.
    pub fn started_at(&self) -> Option<i64> {
        match *self {
            Timer::Stopped => None,
            Timer::Running { started_at, .. } | Timer::Paused { started_at, .. } => {
                Some(started_at)
            }
        }
    }

    fn refuse(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            action,
            state: self.status(),
        }
    }

    pub fn start(&mut self, now: i64) -> Result<()> {
        match self {
            Timer::Stopped => {
                *self = Timer::Running {
                    started_at: now,
                    paused_secs: 0,
                };
                Ok(())
            }
            _ => Err(self.refuse("start")),
        }
    }

    pub fn pause(&mut self, now: i64) -> Result<PauseOutcome> {
        match *self {
            Timer::Running {
                started_at,
                paused_secs,
            } => {
                *self = Timer::Paused {
                    started_at,
                    paused_secs,
                    paused_at: now,
                };
                Ok(PauseOutcome::Paused)
            }
            Timer::Paused { .. } => Ok(PauseOutcome::AlreadyPaused),
            Timer::Stopped => Err(self.refuse("pause")),
        }
    }

    pub fn resume(&mut self, now: i64) -> Result<()> {
        match *self {
            Timer::Paused {
                started_at,
                paused_secs,
                paused_at,
            } => {
                let span = (now - paused_at).max(0) as u64;
                *self = Timer::Running {
                    started_at,
                    paused_secs: paused_secs + span,
                };
                Ok(())
            }
            _ => Err(self.refuse("resume")),
        }
    }

    /// Fails unless there is a session to stop. Lets callers check before asking for a title.
    pub fn ensure_can_stop(&self) -> Result<()> {
        match self {
            Timer::Stopped => Err(self.refuse("stop")),
            _ => Ok(()),
        }
    }

    /// Stops the timer and returns the session's elapsed time.
    ///
    /// A blank `title` aborts with [`Error::EmptyTitle`] and leaves the timer untouched.
    pub fn stop(&mut self, now: i64, title: &str) -> Result<Elapsed> {
        self.ensure_can_stop()?;
        if title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        if let Timer::Paused { .. } = self {
            self.resume(now)?;
        }
        let elapsed = self.elapsed(now);
        *self = Timer::Stopped;
        Ok(elapsed)
    }

    /// Seconds worked since start, net of paused time. `0` when stopped.
    pub fn elapsed_seconds(&self, now: i64) -> u64 {
        let net = match *self {
            Timer::Stopped => 0,
            Timer::Running {
                started_at,
                paused_secs,
            } => now - started_at - paused_secs as i64,
            // The open pause span counts against the total until resumed.
            Timer::Paused {
                started_at,
                paused_secs,
                paused_at,
            } => paused_at - started_at - paused_secs as i64,
        };
        net.max(0) as u64
    }

    pub fn elapsed(&self, now: i64) -> Elapsed {
        Elapsed::from_seconds(self.elapsed_seconds(now))
    }

    /// Seconds spent paused so far, including an open pause.
    pub fn paused_seconds(&self, now: i64) -> u64 {
        match *self {
            Timer::Stopped => 0,
            Timer::Running { paused_secs, .. } => paused_secs,
            Timer::Paused {
                paused_secs,
                paused_at,
                ..
            } => paused_secs + (now - paused_at).max(0) as u64,
        }
    }

    /// Encodes as `status:startEpoch:lastPauseEpoch:pausedAccumulatedSeconds`.
    pub fn encode(&self) -> String {
        let (start, pause, acc) = match *self {
            Timer::Stopped => (0, 0, 0),
            Timer::Running {
                started_at,
                paused_secs,
            } => (started_at, 0, paused_secs),
            Timer::Paused {
                started_at,
                paused_secs,
                paused_at,
            } => (started_at, paused_at, paused_secs),
        };
        format!("{}:{}:{}:{}", self.status(), start, pause, acc)
    }

    /// Decodes the state file contents. Blank contents mean a fresh install.
    pub fn decode(s: &str) -> Result<Timer> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Timer::Stopped);
        }
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != STATE_FIELDS {
            return Err(Error::CorruptState(format!(
                "expected {} fields, found {} in \"{}\"",
                STATE_FIELDS,
                fields.len(),
                s
            )));
        }
        let num = |i: usize| -> Result<i64> {
            fields[i]
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::CorruptState(format!("field {} is not a number: \"{}\"", i + 1, fields[i])))
        };
        let (started_at, paused_at, acc) = (num(1)?, num(2)?, num(3)?);
        if acc < 0 {
            return Err(Error::CorruptState(format!("negative paused time: {}", acc)));
        }
        let paused_secs = acc as u64;
        match fields[0].trim() {
            "stopped" => Ok(Timer::Stopped),
            "running" => Ok(Timer::Running {
                started_at,
                paused_secs,
            }),
            "paused" => Ok(Timer::Paused {
                started_at,
                paused_secs,
                paused_at,
            }),
            other => Err(Error::CorruptState(format!("unknown status \"{}\"", other))),
        }
    }
}

/// True when the state-file contents predate the four-field layout.
pub fn is_legacy_encoding(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.split(':').count() < STATE_FIELDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_pause_resume_stop_scenario() {
        let mut t = Timer::Stopped;
        t.start(0).unwrap();
        assert_eq!(t.pause(600).unwrap(), PauseOutcome::Paused);
        t.resume(900).unwrap();
        let elapsed = t.stop(1800, "wrote parser").unwrap();
        assert_eq!(elapsed.total_seconds(), 1500);
        assert_eq!(elapsed.to_string(), "00:25:00");
        assert_eq!(t, Timer::Stopped);
    }

    #[test]
    fn test_elapsed_net_of_many_pauses() {
        let mut t = Timer::Stopped;
        t.start(1_000).unwrap();
        let mut now = 1_000;
        let mut paused = 0;
        for (work, rest) in [(120, 30), (45, 300), (1, 1), (600, 0)] {
            now += work;
            t.pause(now).unwrap();
            now += rest;
            paused += rest;
            t.resume(now).unwrap();
        }
        now += 10;
        let wall = (now - 1_000) as u64;
        assert_eq!(t.elapsed_seconds(now), wall - paused as u64);
        assert_eq!(t.stop(now, "x").unwrap().total_seconds(), wall - paused as u64);
    }

    #[test]
    fn test_stop_while_paused_folds_open_pause() {
        let mut t = Timer::Stopped;
        t.start(100).unwrap();
        t.pause(400).unwrap();
        assert_eq!(t.elapsed_seconds(10_000), 300);
        let elapsed = t.stop(1_000, "paused stop").unwrap();
        assert_eq!(elapsed.total_seconds(), 300);
        assert_eq!(t, Timer::Stopped);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut t = Timer::Stopped;
        assert!(matches!(t.stop(5, "x"), Err(Error::InvalidTransition { action: "stop", .. })));
        assert!(matches!(t.pause(5), Err(Error::InvalidTransition { action: "pause", .. })));
        assert!(matches!(t.resume(5), Err(Error::InvalidTransition { action: "resume", .. })));

        t.start(5).unwrap();
        assert!(matches!(t.start(6), Err(Error::InvalidTransition { action: "start", state: "running" })));
        assert!(matches!(t.resume(6), Err(Error::InvalidTransition { action: "resume", .. })));

        t.pause(7).unwrap();
        assert!(matches!(t.start(8), Err(Error::InvalidTransition { action: "start", state: "paused" })));
    }

    #[test]
    fn test_pause_when_paused_is_not_fatal() {
        let mut t = Timer::Stopped;
        t.start(0).unwrap();
        t.pause(10).unwrap();
        let before = t;
        assert_eq!(t.pause(20).unwrap(), PauseOutcome::AlreadyPaused);
        assert_eq!(t, before);
    }

    #[test]
    fn test_stop_with_empty_title_changes_nothing() {
        let mut t = Timer::Stopped;
        t.start(0).unwrap();
        let running = t;
        assert!(matches!(t.stop(50, ""), Err(Error::EmptyTitle)));
        assert!(matches!(t.stop(50, "   "), Err(Error::EmptyTitle)));
        assert_eq!(t, running);

        t.pause(60).unwrap();
        let paused = t;
        assert!(matches!(t.stop(70, ""), Err(Error::EmptyTitle)));
        assert_eq!(t, paused);
    }

    #[test]
    fn test_elapsed_is_zero_when_stopped_or_clock_went_back() {
        assert_eq!(Timer::Stopped.elapsed_seconds(12345), 0);
        let t = Timer::Running {
            started_at: 1_000,
            paused_secs: 0,
        };
        assert_eq!(t.elapsed_seconds(900), 0);
    }

    #[test]
    fn test_encode_fields() {
        assert_eq!(Timer::Stopped.encode(), "stopped:0:0:0");
        let t = Timer::Running {
            started_at: 1700000000,
            paused_secs: 30,
        };
        assert_eq!(t.encode(), "running:1700000000:0:30");
        let t = Timer::Paused {
            started_at: 1700000000,
            paused_secs: 30,
            paused_at: 1700000600,
        };
        assert_eq!(t.encode(), "paused:1700000000:1700000600:30");
        assert_eq!(Timer::decode(&t.encode()).unwrap(), t);
    }

    #[test]
    fn test_decode_blank_is_stopped() {
        assert_eq!(Timer::decode("").unwrap(), Timer::Stopped);
        assert_eq!(Timer::decode("  \n").unwrap(), Timer::Stopped);
        assert_eq!(Timer::decode("stopped:0:0:0\n").unwrap(), Timer::Stopped);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(Timer::decode("running:abc:0:0"), Err(Error::CorruptState(_))));
        assert!(matches!(Timer::decode("walking:0:0:0"), Err(Error::CorruptState(_))));
        assert!(matches!(Timer::decode("running:0:0:-5"), Err(Error::CorruptState(_))));
        assert!(matches!(Timer::decode("running:0:0:0:0"), Err(Error::CorruptState(_))));
        assert!(matches!(Timer::decode("running:1700000000:0"), Err(Error::CorruptState(_))));
    }

    #[test]
    fn test_is_legacy_encoding() {
        assert!(is_legacy_encoding("running:1700000000:0"));
        assert!(is_legacy_encoding("stopped"));
        assert!(!is_legacy_encoding("stopped:0:0:0"));
        assert!(!is_legacy_encoding(""));
    }
}
