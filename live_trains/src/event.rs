use chrono::{DateTime, Utc};
use shared_kernel::train_number::TrainNumber;

/// One observation point of a train's timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableRow {
    pub station_code: String,
    pub actual_time: Option<DateTime<Utc>>,
    pub live_estimate_time: Option<DateTime<Utc>>,
    /// Signed delay in minutes, positive when late.
    pub difference_in_minutes: Option<i32>,
    /// `[category, detailed?, third?]`, most general first.
    pub causes: Vec<String>,
}

/// A single live-train update from the feed, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainEvent {
    pub train_number: TrainNumber,
    pub commuter_line_code: String,
    pub cancelled: bool,
    pub timetable_rows: Vec<TimetableRow>,
}
