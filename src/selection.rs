use crate::error::GridError;
use crate::event::SlotKey;
use crate::grid::Grid;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::iter::FromIterator;

/// What a toggle is aimed at: one cell, one time across all dates, or one
/// date across all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Cell(SlotKey),
    Row(NaiveTime),
    Col(NaiveDate),
}

/// Provenance of a grid event. The interactive layer fires refresh events
/// when it re-renders; only genuine user clicks may mutate the selection,
/// so the two are distinct variants instead of a nullable click counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAction {
    User(Target),
    SystemRefresh,
}

/// One participant's unsaved selection for one event.
///
/// This is the per-session state that diverges from persisted marks until
/// an explicit save. Every operation takes the set by reference and returns
/// a new value; a failed toggle leaves the caller's set untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySet {
    slots: BTreeSet<SlotKey>,
}

impl AvailabilitySet {
    pub fn new() -> AvailabilitySet {
        AvailabilitySet::default()
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.slots.contains(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Selected keys in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotKey> {
        self.slots.iter()
    }

    /// Routes an action from the interactive layer. `SystemRefresh` is a
    /// silent no-op so re-render events can never flip state.
    pub fn apply(&self, action: &GridAction, grid: &Grid) -> Result<AvailabilitySet, GridError> {
        match action {
            GridAction::SystemRefresh => Ok(self.clone()),
            GridAction::User(Target::Cell(key)) => self.toggle_cell(*key, grid),
            GridAction::User(Target::Row(time)) => self.toggle_row(*time, grid),
            GridAction::User(Target::Col(date)) => self.toggle_col(*date, grid),
        }
    }

    /// Flips membership of a single cell. Self-inverse: applying it twice
    /// to an unchanged set returns the original set.
    pub fn toggle_cell(&self, key: SlotKey, grid: &Grid) -> Result<AvailabilitySet, GridError> {
        if !grid.contains(&key) {
            debug!("rejected toggle of off-grid cell {}", key);
            return Err(GridError::OutOfRange {
                target: format!("Cell {}", key),
            });
        }

        let mut next = self.clone();
        if !next.slots.remove(&key) {
            next.slots.insert(key);
        }
        Ok(next)
    }

    /// Toggles one time across every date. If the whole row is selected in
    /// the pre-toggle set it is cleared; otherwise the whole row is
    /// selected. Evaluated atomically, never cell by cell.
    pub fn toggle_row(&self, time: NaiveTime, grid: &Grid) -> Result<AvailabilitySet, GridError> {
        if !grid.has_slot(time) {
            debug!("rejected toggle of off-grid row {}", time.format("%H:%M"));
            return Err(GridError::OutOfRange {
                target: format!("Row {}", time.format("%H:%M")),
            });
        }

        let keys = grid.dates.iter().map(|&date| SlotKey::new(date, time));
        Ok(self.toggle_all(keys))
    }

    /// Toggles one date across every time; symmetric to [`toggle_row`].
    ///
    /// [`toggle_row`]: AvailabilitySet::toggle_row
    pub fn toggle_col(&self, date: NaiveDate, grid: &Grid) -> Result<AvailabilitySet, GridError> {
        if !grid.has_date(date) {
            debug!("rejected toggle of off-grid column {}", date);
            return Err(GridError::OutOfRange {
                target: format!("Column {}", date),
            });
        }

        let keys = grid.slots.iter().map(|&time| SlotKey::new(date, time));
        Ok(self.toggle_all(keys))
    }

    /// The tri-state-to-binary rule: all-selected clears, anything else
    /// selects all. Membership is tested against the pre-toggle set.
    fn toggle_all<I>(&self, keys: I) -> AvailabilitySet
    where
        I: Iterator<Item = SlotKey> + Clone,
    {
        let mut next = self.clone();
        if keys.clone().all(|key| self.slots.contains(&key)) {
            for key in keys {
                next.slots.remove(&key);
            }
        } else {
            for key in keys {
                next.slots.insert(key);
            }
        }
        next
    }
}

impl FromIterator<SlotKey> for AvailabilitySet {
    fn from_iter<I: IntoIterator<Item = SlotKey>>(iter: I) -> Self {
        AvailabilitySet {
            slots: iter.into_iter().collect(),
        }
    }
}
