use crate::event::SLOT_MINUTES;
use crate::time::{TimeMerge, TimeRange};
use chrono::{NaiveTime, Timelike};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One merged run of consecutive slots, rendered for summary and export
/// views: `9:00am` for a single slot, `9:00-10:30am` for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeLabel {
    pub label: String,
}

impl RangeLabel {
    fn from_run(run: TimeRange<u16>) -> RangeLabel {
        let label = if run.start() == run.end() {
            clock_label(run.start(), true)
        } else {
            // the printed end is exclusive: available through the end of
            // the run's final half-hour block
            format!(
                "{}-{}",
                clock_label(run.start(), false),
                clock_label(run.end() + SLOT_MINUTES, true)
            )
        };
        RangeLabel { label }
    }
}

impl fmt::Display for RangeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Collapses one participant's slot starts for a single date into minimal
/// contiguous ranges, chronological by run start.
///
/// The input need not be sorted and may contain duplicates; an empty input
/// produces an empty sequence. Consecutive entries exactly one slot step
/// apart extend the current run; any larger gap closes it.
///
/// # Examples
/// ```
/// use chrono::NaiveTime;
/// use treffzeit_libs::merge::merge_ranges;
///
/// let times = vec![
///     NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
/// ];
///
/// let ranges = merge_ranges(&times);
/// assert_eq!(ranges.len(), 1);
/// assert_eq!(ranges[0].label, "9:00-10:30am");
/// ```
pub fn merge_ranges(times: &[NaiveTime]) -> Vec<RangeLabel> {
    let starts: Vec<TimeRange<u16>> = times
        .iter()
        .map(|time| (time.num_seconds_from_midnight() / 60) as u16)
        .sorted_unstable()
        .dedup()
        .map(|minutes| TimeRange::new(minutes, minutes))
        .collect();

    starts
        .iter()
        .time_merge(SLOT_MINUTES)
        .into_iter()
        .map(RangeLabel::from_run)
        .collect()
}

/// Lowercase 12-hour clock label for a minute offset; `1440` wraps to
/// `12:00am` so a run ending on the last slot of the day still prints.
fn clock_label(minutes: u16, with_period: bool) -> String {
    let minutes = minutes % (24 * 60);
    let hour24 = minutes / 60;
    let minute = minutes % 60;
    let hour12 = match hour24 % 12 {
        0 => 12,
        hour => hour,
    };

    if with_period {
        let period = if hour24 < 12 { "am" } else { "pm" };
        format!("{}:{:02}{}", hour12, minute, period)
    } else {
        format!("{}:{:02}", hour12, minute)
    }
}
