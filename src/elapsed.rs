// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>

//! Hours/minutes/seconds arithmetic for session durations.
//!
//! Minutes and seconds are always kept in `[0, 60)`; hours absorb the overflow.
//! Sums go through total seconds so partial sums never carry un-normalised minutes.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
}

impl Elapsed {
    pub fn from_seconds(total: u64) -> Self {
        let (rest, seconds) = (total / 60, total % 60);
        let (hours, minutes) = (rest / 60, rest % 60);
        Elapsed {
            hours,
            minutes: minutes as u8,
            seconds: seconds as u8,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    /// Parses `HH:MM:SS`; hours may have any number of digits.
    pub fn parse_hms(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, ':');
        let hours: u64 = parts.next()?.parse().ok()?;
        let minutes: u8 = parts.next()?.parse().ok()?;
        let seconds: u8 = parts.next()?.parse().ok()?;
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        Some(Elapsed {
            hours,
            minutes,
            seconds,
        })
    }

    /// `1 hour(s) and 15 minute(s)`, as printed by `tt list --sum`.
    pub fn summary(&self) -> String {
        format!("{} hour(s) and {} minute(s)", self.hours, self.minutes)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl Add for Elapsed {
    type Output = Elapsed;

    fn add(self, rhs: Elapsed) -> Elapsed {
        Elapsed::from_seconds(self.total_seconds() + rhs.total_seconds())
    }
}

impl Sum for Elapsed {
    fn sum<I: Iterator<Item = Elapsed>>(iter: I) -> Elapsed {
        iter.fold(Elapsed::default(), Add::add)
    }
}
