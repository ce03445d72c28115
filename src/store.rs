use crate::error::GridError;
use crate::event::{Event, Mark, SlotKey};
use crate::grid::Grid;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// Share-link tokens keep the first 8 hex chars of a v4 uuid.
pub const TOKEN_LENGTH: usize = 8;

/// Organizer input for a new event; the token is generated on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
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

/// The persistence contract the grid engine consumes. Callers pass a store
/// handle explicitly; the engine holds no connection state of its own.
///
/// `replace_marks` must be atomic per (event, participant): either the
/// participant's whole mark set is replaced or nothing changes. Writes for
/// different participants are independent.
pub trait AvailabilityStore {
    /// Validates the window, generates a unique token, and commits.
    fn create_event(&mut self, new: NewEvent) -> Result<Event, GridError>;

    fn get_event(&self, token: &str) -> Result<Event, GridError>;

    /// Deletes the event and cascades to all of its marks.
    fn delete_event(&mut self, token: &str) -> Result<(), GridError>;

    /// Every persisted mark for the event, ordered by participant then slot.
    fn marks(&self, token: &str) -> Result<Vec<Mark>, GridError>;

    /// One participant's saved slot keys, in canonical order.
    fn participant_marks(&self, token: &str, participant: &str)
        -> Result<Vec<SlotKey>, GridError>;

    /// Replaces the participant's entire mark set. Keys are validated
    /// against the event's grid before any mutation.
    fn replace_marks(
        &mut self,
        token: &str,
        participant: &str,
        slots: &[SlotKey],
    ) -> Result<(), GridError>;
}

/// In-memory record store backing tests and benches. Rows are keyed by
/// event token, then participant name, mirroring the isolation the
/// surrounding system's transactions provide.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: HashMap<String, Event>,
    marks: HashMap<String, BTreeMap<String, BTreeSet<SlotKey>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn next_token(&self) -> String {
        let mut token = new_token();
        // uuid collisions at 8 chars are unlikely but cheap to rule out
        while self.events.contains_key(&token) {
            token = new_token();
        }
        token
    }
}

fn new_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(TOKEN_LENGTH);
    token
}

impl AvailabilityStore for MemoryStore {
    fn create_event(&mut self, new: NewEvent) -> Result<Event, GridError> {
        let mut event = Event {
            token: String::new(),
            name: new.name,
            timezone: new.timezone,
            start_date: new.start_date,
            end_date: new.end_date,
            start_time: new.start_time,
            end_time: new.end_time,
        };
        Grid::compute(&event)?;

        event.token = self.next_token();
        debug!("created event {} ({})", event.token, event.name);
        self.events.insert(event.token.clone(), event.clone());
        Ok(event)
    }

    fn get_event(&self, token: &str) -> Result<Event, GridError> {
        self.events
            .get(token)
            .cloned()
            .ok_or_else(|| GridError::NotFound(token.to_string()))
    }

    fn delete_event(&mut self, token: &str) -> Result<(), GridError> {
        self.events
            .remove(token)
            .ok_or_else(|| GridError::NotFound(token.to_string()))?;
        let cascaded = self.marks.remove(token).map_or(0, |rows| rows.len());
        debug!("deleted event {} and {} participant rows", token, cascaded);
        Ok(())
    }

    fn marks(&self, token: &str) -> Result<Vec<Mark>, GridError> {
        if !self.events.contains_key(token) {
            return Err(GridError::NotFound(token.to_string()));
        }

        Ok(self.marks.get(token).map_or_else(Vec::new, |rows| {
            rows.iter()
                .flat_map(|(participant, slots)| {
                    slots.iter().map(move |&slot| Mark::new(participant, slot))
                })
                .collect()
        }))
    }

    fn participant_marks(
        &self,
        token: &str,
        participant: &str,
    ) -> Result<Vec<SlotKey>, GridError> {
        if !self.events.contains_key(token) {
            return Err(GridError::NotFound(token.to_string()));
        }

        Ok(self
            .marks
            .get(token)
            .and_then(|rows| rows.get(participant))
            .map_or_else(Vec::new, |slots| slots.iter().copied().collect()))
    }

    fn replace_marks(
        &mut self,
        token: &str,
        participant: &str,
        slots: &[SlotKey],
    ) -> Result<(), GridError> {
        let event = self
            .events
            .get(token)
            .ok_or_else(|| GridError::NotFound(token.to_string()))?;
        let grid = Grid::compute(event)?;

        for slot in slots {
            if !grid.contains(slot) {
                return Err(GridError::OutOfRange {
                    target: format!("Cell {}", slot),
                });
            }
        }

        let rows = self
            .marks
            .entry(token.to_string())
            .or_insert_with(BTreeMap::new);
        let set: BTreeSet<SlotKey> = slots.iter().copied().collect();
        debug!(
            "replaced marks for {:?} in event {}: {} slots",
            participant,
            token,
            set.len()
        );
        if set.is_empty() {
            rows.remove(participant);
        } else {
            rows.insert(participant.to_string(), set);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn new_event() -> NewEvent {
        NewEvent {
            name: "Team Meeting".to_string(),
            timezone: "America/Chicago".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 7, 11).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }
    }

    fn key(s: &str) -> SlotKey {
        s.parse().unwrap()
    }

    #[test]
    fn created_events_get_distinct_short_tokens() {
        let mut store = MemoryStore::new();
        let a = store.create_event(new_event()).unwrap();
        let b = store.create_event(new_event()).unwrap();

        assert_eq!(a.token.len(), TOKEN_LENGTH);
        assert_ne!(a.token, b.token);
        assert_eq!(store.get_event(&a.token).unwrap(), a);
    }

    #[test]
    fn create_rejects_invalid_windows() {
        let mut store = MemoryStore::new();
        let mut reversed = new_event();
        reversed.start_time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

        assert!(matches!(
            store.create_event(reversed),
            Err(GridError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn unknown_tokens_are_not_found() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.get_event("missing"),
            Err(GridError::NotFound("missing".to_string()))
        );
        assert_eq!(
            store.marks("missing"),
            Err(GridError::NotFound("missing".to_string()))
        );
        assert_eq!(
            store.delete_event("missing"),
            Err(GridError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn replace_then_read_round_trips_as_a_set() {
        let mut store = MemoryStore::new();
        let event = store.create_event(new_event()).unwrap();

        let saved = vec![
            key("2024-07-12T09:30"),
            key("2024-07-11T09:00"),
            key("2024-07-11T09:30"),
        ];
        store.replace_marks(&event.token, "Alice", &saved).unwrap();

        let mut expected = saved.clone();
        expected.sort();
        assert_eq!(
            store.participant_marks(&event.token, "Alice").unwrap(),
            expected
        );
    }

    #[test]
    fn replace_swaps_the_whole_mark_set() {
        let mut store = MemoryStore::new();
        let event = store.create_event(new_event()).unwrap();

        store
            .replace_marks(&event.token, "Alice", &[key("2024-07-11T09:00")])
            .unwrap();
        store
            .replace_marks(&event.token, "Alice", &[key("2024-07-12T10:00")])
            .unwrap();

        assert_eq!(
            store.participant_marks(&event.token, "Alice").unwrap(),
            vec![key("2024-07-12T10:00")]
        );
    }

    #[test]
    fn out_of_grid_saves_fail_without_partial_writes() {
        let mut store = MemoryStore::new();
        let event = store.create_event(new_event()).unwrap();
        store
            .replace_marks(&event.token, "Alice", &[key("2024-07-11T09:00")])
            .unwrap();

        let result = store.replace_marks(
            &event.token,
            "Alice",
            &[key("2024-07-11T09:30"), key("2024-07-13T09:00")],
        );
        assert!(matches!(result, Err(GridError::OutOfRange { .. })));
        // prior marks are intact
        assert_eq!(
            store.participant_marks(&event.token, "Alice").unwrap(),
            vec![key("2024-07-11T09:00")]
        );
    }

    #[test]
    fn participants_do_not_disturb_each_other() {
        let mut store = MemoryStore::new();
        let event = store.create_event(new_event()).unwrap();

        store
            .replace_marks(&event.token, "Alice", &[key("2024-07-11T09:00")])
            .unwrap();
        store
            .replace_marks(&event.token, "Bob", &[key("2024-07-12T10:00")])
            .unwrap();
        store.replace_marks(&event.token, "Alice", &[]).unwrap();

        assert!(store.participant_marks(&event.token, "Alice").unwrap().is_empty());
        assert_eq!(
            store.participant_marks(&event.token, "Bob").unwrap(),
            vec![key("2024-07-12T10:00")]
        );
    }

    #[test]
    fn delete_cascades_to_marks() {
        let mut store = MemoryStore::new();
        let event = store.create_event(new_event()).unwrap();
        store
            .replace_marks(&event.token, "Alice", &[key("2024-07-11T09:00")])
            .unwrap();

        store.delete_event(&event.token).unwrap();
        assert!(matches!(
            store.marks(&event.token),
            Err(GridError::NotFound(_))
        ));
    }

    #[test]
    fn marks_list_orders_by_participant_then_slot() {
        let mut store = MemoryStore::new();
        let event = store.create_event(new_event()).unwrap();
        store
            .replace_marks(&event.token, "Bob", &[key("2024-07-11T09:00")])
            .unwrap();
        store
            .replace_marks(
                &event.token,
                "Alice",
                &[key("2024-07-12T09:00"), key("2024-07-11T09:30")],
            )
            .unwrap();

        let marks = store.marks(&event.token).unwrap();
        assert_eq!(
            marks,
            vec![
                Mark::new("Alice", key("2024-07-11T09:30")),
                Mark::new("Alice", key("2024-07-12T09:00")),
                Mark::new("Bob", key("2024-07-11T09:00")),
            ]
        );
    }
}
