use crate::error::GridError;
use crate::event::{Event, SlotKey, SLOT_MINUTES};
use chrono::{NaiveDate, NaiveTime, Timelike};
use log::trace;

/// Defensive bound on slot stepping. A day holds at most 48 half-hour
/// starts; a window that would produce more can never terminate cleanly.
pub const MAX_SLOTS_PER_DAY: usize = 48;

/// The canonical coordinate space of an event: every calendar date in the
/// configured range crossed with every half-hour start time in the daily
/// window. All toggles and marks are validated against this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub dates: Vec<NaiveDate>,
    pub slots: Vec<NaiveTime>,
}

impl Grid {
    /// Derives the grid from an event's window.
    ///
    /// `dates` runs from `start_date` to `end_date` inclusive. `slots` runs
    /// from `start_time` to `end_time` inclusive, stepping 30 minutes: the
    /// end boundary is the last bookable start time, not an exclusive
    /// window end.
    ///
    /// Pure and deterministic. Callers recompute on demand; there is no
    /// cache to invalidate.
    ///
    /// # Errors
    /// `GridError::InvalidWindow` when the date range or time window is
    /// reversed, a window time is not whole minutes, or stepping would
    /// exceed [`MAX_SLOTS_PER_DAY`].
    pub fn compute(event: &Event) -> Result<Grid, GridError> {
        if event.start_date > event.end_date {
            return Err(GridError::InvalidWindow {
                reason: format!(
                    "date range {} to {} is reversed",
                    event.start_date, event.end_date
                ),
            });
        }
        if event.start_time > event.end_time {
            return Err(GridError::InvalidWindow {
                reason: format!(
                    "time window {} to {} is reversed",
                    event.start_time.format("%H:%M"),
                    event.end_time.format("%H:%M")
                ),
            });
        }
        for time in [event.start_time, event.end_time].iter() {
            if time.second() != 0 || time.nanosecond() != 0 {
                return Err(GridError::InvalidWindow {
                    reason: format!("window time {} is not whole minutes", time),
                });
            }
        }

        let start_minutes = event.start_time.num_seconds_from_midnight() / 60;
        let end_minutes = event.end_time.num_seconds_from_midnight() / 60;

        let slot_count = ((end_minutes - start_minutes) / u32::from(SLOT_MINUTES)) as usize + 1;
        if slot_count > MAX_SLOTS_PER_DAY {
            return Err(GridError::InvalidWindow {
                reason: format!("{} slots exceeds the {} per-day cap", slot_count, MAX_SLOTS_PER_DAY),
            });
        }

        let mut slots = Vec::with_capacity(slot_count);
        let mut minutes = start_minutes;
        while minutes <= end_minutes {
            let slot = NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0).ok_or_else(
                || GridError::InvalidWindow {
                    reason: format!("slot offset {} is past midnight", minutes),
                },
            )?;
            slots.push(slot);
            minutes += u32::from(SLOT_MINUTES);
        }

        let dates: Vec<NaiveDate> = event
            .start_date
            .iter_days()
            .take_while(|date| *date <= event.end_date)
            .collect();

        trace!(
            "computed grid for {}: {} dates x {} slots",
            event.token,
            dates.len(),
            slots.len()
        );

        Ok(Grid { dates, slots })
    }

    /// Whether the key names a valid cell of this grid.
    pub fn contains(&self, key: &SlotKey) -> bool {
        self.has_date(key.date) && self.has_slot(key.time)
    }

    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn has_slot(&self, time: NaiveTime) -> bool {
        self.slots.binary_search(&time).is_ok()
    }

    /// Every cell in canonical order: date-major, then time ascending.
    pub fn cells(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.dates.iter().flat_map(move |&date| {
            self.slots.iter().map(move |&time| SlotKey::new(date, time))
        })
    }

    pub fn cell_count(&self) -> usize {
        self.dates.len() * self.slots.len()
    }
}
