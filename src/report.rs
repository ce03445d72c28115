use crate::error::GridError;
use crate::grid::Grid;
use crate::merge::{merge_ranges, RangeLabel};
use crate::store::AvailabilityStore;
use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One participant's merged availability on one event date. `ranges` is
/// empty when they marked nothing that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub ranges: Vec<RangeLabel>,
}

/// One row of the admin/export table: participant x date x merged ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub participant: String,
    pub days: Vec<DaySummary>,
}

/// Builds the tabular extract behind the admin summary and spreadsheet
/// export: participants ordered by name, one entry per grid date holding
/// that day's merged range labels. Rendering is the caller's concern.
pub fn summarize<S>(store: &S, token: &str) -> Result<Vec<ReportRow>, GridError>
where
    S: AvailabilityStore + ?Sized,
{
    let event = store.get_event(token)?;
    let grid = Grid::compute(&event)?;
    let marks = store.marks(token)?;

    let participants: Vec<String> = marks
        .iter()
        .map(|mark| mark.participant.clone())
        .sorted()
        .dedup()
        .collect();

    let rows = participants
        .into_iter()
        .map(|participant| {
            let days = grid
                .dates
                .iter()
                .map(|&date| {
                    let times: Vec<NaiveTime> = marks
                        .iter()
                        .filter(|mark| mark.participant == participant && mark.slot.date == date)
                        .map(|mark| mark.slot.time)
                        .collect();
                    DaySummary {
                        date,
                        ranges: merge_ranges(&times),
                    }
                })
                .collect();
            ReportRow { participant, days }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SlotKey;
    use crate::store::{MemoryStore, NewEvent};
    use chrono::NaiveDate;

    fn key(s: &str) -> SlotKey {
        s.parse().unwrap()
    }

    fn seeded_store() -> (MemoryStore, String) {
        let mut store = MemoryStore::new();
        let event = store
            .create_event(NewEvent {
                name: "Standup".to_string(),
                timezone: "UTC".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 7, 11).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
                start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            })
            .unwrap();
        (store, event.token)
    }

    #[test]
    fn rows_cover_every_grid_date_per_participant() {
        let (mut store, token) = seeded_store();
        store
            .replace_marks(
                &token,
                "Bob",
                &[key("2024-07-11T09:00"), key("2024-07-11T09:30")],
            )
            .unwrap();
        store
            .replace_marks(&token, "Alice", &[key("2024-07-12T10:00")])
            .unwrap();

        let rows = summarize(&store, &token).unwrap();
        assert_eq!(rows.len(), 2);

        // participants come out sorted by name
        assert_eq!(rows[0].participant, "Alice");
        assert_eq!(rows[1].participant, "Bob");

        // Alice marked nothing on the first day
        assert!(rows[0].days[0].ranges.is_empty());
        assert_eq!(rows[0].days[1].ranges[0].label, "10:00am");

        // Bob's consecutive slots merge into one range
        assert_eq!(rows[1].days[0].ranges[0].label, "9:00-10:00am");
        assert!(rows[1].days[1].ranges.is_empty());
    }

    #[test]
    fn empty_events_produce_no_rows() {
        let (store, token) = seeded_store();
        assert!(summarize(&store, &token).unwrap().is_empty());
    }

    #[test]
    fn unknown_events_are_not_found() {
        let (store, _) = seeded_store();
        assert!(matches!(
            summarize(&store, "missing"),
            Err(GridError::NotFound(_))
        ));
    }
}
