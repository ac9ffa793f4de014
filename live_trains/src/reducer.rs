use crate::event::TimetableRow;
use chrono::{DateTime, Utc};

/// The two facts a delay decision needs out of a train's timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReducedTimetable<'a> {
    pub latest_actual: Option<&'a TimetableRow>,
    pub latest_estimate: Option<&'a TimetableRow>,
}

/// Picks the row with the greatest timestamp for `field`. Rows are visited in
/// feed order and only a strictly later timestamp replaces the current pick,
/// so the first of several equal maxima wins.
fn latest_by<'a>(
    rows: &'a [TimetableRow],
    field: impl Fn(&TimetableRow) -> Option<DateTime<Utc>>,
) -> Option<&'a TimetableRow> {
    let mut latest: Option<(&TimetableRow, DateTime<Utc>)> = None;
    for row in rows {
        let Some(time) = field(row) else {
            continue;
        };
        match latest {
            Some((_, current)) if time <= current => {}
            _ => latest = Some((row, time)),
        }
    }
    latest.map(|(row, _)| row)
}

/// Selects the rows with the latest actual time and the latest live estimate.
///
/// This is the maximum timestamp for each field, not the train's next stop.
pub fn reduce(rows: &[TimetableRow]) -> ReducedTimetable<'_> {
    ReducedTimetable {
        latest_actual: latest_by(rows, |row| row.actual_time),
        latest_estimate: latest_by(rows, |row| row.live_estimate_time),
    }
}
