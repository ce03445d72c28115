use crate::error::GridError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slot granularity in minutes. Every bookable unit is one half hour.
pub const SLOT_MINUTES: u16 = 30;

/// An event as configured by its organizer. Immutable once created;
/// the only edit path is deletion, which cascades to availability rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique token, also the share link path segment
    pub token: String,
    pub name: String,
    /// Informational label only, never used for conversion
    pub timezone: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "startTime")]
    pub start_time: NaiveTime,
    #[serde(rename = "endTime")]
    pub end_time: NaiveTime,
}

/// The (date, time-of-day) coordinate of one grid cell.
///
/// Ordering is date-major, then time ascending. The canonical string
/// form is `YYYY-MM-DDTHH:MM`, which is also how marks are persisted.
///
/// # Examples
/// ```
/// use treffzeit_libs::event::SlotKey;
///
/// let key: SlotKey = "2024-07-11T09:00".parse().unwrap();
/// assert_eq!(key.to_string(), "2024-07-11T09:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: NaiveTime) -> SlotKey {
        SlotKey { date, time }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{}",
            self.date.format("%Y-%m-%d"),
            self.time.format("%H:%M")
        )
    }
}

impl FromStr for SlotKey {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, 'T');
        let out_of_range = || GridError::OutOfRange {
            target: format!("Slot key {:?}", s),
        };

        let date = parts
            .next()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(out_of_range)?;
        let time = parts
            .next()
            .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
            .ok_or_else(out_of_range)?;

        Ok(SlotKey { date, time })
    }
}

/// A persisted record that a participant selected a slot as available.
/// Participant names are free text and the sole identity mechanism.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mark {
    pub participant: String,
    pub slot: SlotKey,
}

impl Mark {
    pub fn new(participant: &str, slot: SlotKey) -> Mark {
        Mark {
            participant: participant.to_string(),
            slot,
        }
    }
}
