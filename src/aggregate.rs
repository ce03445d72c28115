use crate::event::{Mark, SlotKey};
use crate::grid::Grid;
use crate::selection::AvailabilitySet;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Placeholder under which a viewer's unsaved selection is counted.
/// It stands in only until the viewer's real name is saved for the cell.
pub const PENDING_NAME: &str = "You";

/// An rgb display color on the proportional availability scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Reference color for a cell nobody selected.
    pub const EMPTY: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Reference color for a cell the whole group selected.
    pub const FULL: Color = Color {
        r: 90,
        g: 140,
        b: 200,
    };

    /// Linear interpolation between [`EMPTY`] and [`FULL`], each channel
    /// independent, keyed on `count / max_count`. A count of zero is always
    /// exactly [`EMPTY`] regardless of `max_count`. Live grid and summary
    /// views both call this so they agree numerically.
    ///
    /// [`EMPTY`]: Color::EMPTY
    /// [`FULL`]: Color::FULL
    ///
    /// # Examples
    /// ```
    /// use treffzeit_libs::aggregate::Color;
    ///
    /// assert_eq!(Color::heat(0, 4), Color::EMPTY);
    /// assert_eq!(Color::heat(4, 4), Color::FULL);
    /// ```
    pub fn heat(count: usize, max_count: usize) -> Color {
        if count == 0 {
            return Color::EMPTY;
        }

        let ratio = count as f32 / max_count.max(1) as f32;
        Color {
            r: lerp(Color::EMPTY.r, Color::FULL.r, ratio),
            g: lerp(Color::EMPTY.g, Color::FULL.g, ratio),
            b: lerp(Color::EMPTY.b, Color::FULL.b, ratio),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

fn lerp(from: u8, to: u8, ratio: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * ratio).round() as u8
}

/// The viewer's unsaved selection, unioned into the aggregate so the grid
/// reflects pending work without double-counting saved marks.
#[derive(Debug, Clone, Copy)]
pub struct PendingSelection<'a> {
    pub name: &'a str,
    pub set: &'a AvailabilitySet,
}

/// Who is available in one cell. `names` is deduplicated and sorted;
/// `count` is the number of distinct names, placeholder included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSummary {
    pub names: Vec<String>,
    pub count: usize,
}

/// Scale legend for the heat map, derived from the aggregated maximum
/// rather than any fixed grid size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub low: String,
    pub high: String,
}

impl Legend {
    pub fn of(max_count: usize) -> Legend {
        let max_count = max_count.max(1);
        Legend {
            low: format!("1/{} Available", max_count),
            high: format!("{}/{} Available", max_count, max_count),
        }
    }
}

/// The whole roster's availability, bucketed per cell.
///
/// Always recomputed from scratch: the data volume is participants x slots,
/// small enough that recomputation beats incremental maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSummary {
    pub cells: BTreeMap<SlotKey, CellSummary>,
    #[serde(rename = "maxCount")]
    pub max_count: usize,
}

impl GridSummary {
    /// Buckets every persisted mark's name under its slot key, then unions
    /// the viewer's pending cells under [`PENDING_NAME`] wherever their real
    /// name is not already present. Marks outside the grid are skipped.
    pub fn aggregate(
        grid: &Grid,
        marks: &[Mark],
        pending: Option<PendingSelection<'_>>,
    ) -> GridSummary {
        let mut buckets: BTreeMap<SlotKey, BTreeSet<String>> = BTreeMap::new();

        for mark in marks {
            if !grid.contains(&mark.slot) {
                trace!("skipping off-grid mark {} by {}", mark.slot, mark.participant);
                continue;
            }
            buckets
                .entry(mark.slot)
                .or_insert_with(BTreeSet::new)
                .insert(mark.participant.clone());
        }

        if let Some(pending) = pending {
            for key in pending.set.iter() {
                if !grid.contains(key) {
                    continue;
                }
                let names = buckets.entry(*key).or_insert_with(BTreeSet::new);
                if !names.contains(pending.name) {
                    names.insert(PENDING_NAME.to_string());
                }
            }
        }

        let cells: BTreeMap<SlotKey, CellSummary> = buckets
            .into_iter()
            .map(|(key, names)| {
                let names: Vec<String> = names.into_iter().collect();
                let count = names.len();
                (key, CellSummary { names, count })
            })
            .collect();

        let max_count = cells.values().map(|cell| cell.count).max().unwrap_or(0).max(1);

        GridSummary { cells, max_count }
    }

    pub fn count(&self, key: &SlotKey) -> usize {
        self.cells.get(key).map_or(0, |cell| cell.count)
    }

    pub fn names(&self, key: &SlotKey) -> &[String] {
        self.cells.get(key).map_or(&[], |cell| cell.names.as_slice())
    }

    /// Display color for one cell on the proportional scale.
    pub fn color(&self, key: &SlotKey) -> Color {
        Color::heat(self.count(key), self.max_count)
    }

    pub fn legend(&self) -> Legend {
        Legend::of(self.max_count)
    }
}
