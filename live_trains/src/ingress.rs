//! Coercion of schema-less feed records into [`TrainEvent`]s.
//!
//! Only the surface of a batch (a JSON array) is required to be valid. A
//! record that cannot be coerced is dropped on its own, and so is a single
//! malformed timetable row inside an otherwise valid record.

use crate::event::{TimetableRow, TrainEvent};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use shared_kernel::train_number::TrainNumber;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngressError {
    #[error("feed batch is not a JSON array of records: {0}")]
    NotAnArray(serde_json::Error),
    #[error("invalid train record: {0}")]
    InvalidRecord(serde_json::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrainEvent {
    train_number: TrainNumber,
    #[serde(rename = "commuterLineID", default)]
    commuter_line_id: Option<String>,
    #[serde(default)]
    cancelled: Option<bool>,
    #[serde(default)]
    time_table_rows: Option<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimetableRow {
    station_short_code: String,
    #[serde(default)]
    actual_time: Option<DateTime<Utc>>,
    #[serde(default)]
    live_estimate_time: Option<DateTime<Utc>>,
    #[serde(default)]
    difference_in_minutes: Option<i32>,
    #[serde(default)]
    causes: Option<Vec<RawCause>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCauseCategories {
    category_code: Option<String>,
    detailed_category_code: Option<String>,
    third_category_code: Option<String>,
}

impl RawCauseCategories {
    fn into_codes(self) -> Vec<String> {
        [
            self.category_code,
            self.detailed_category_code,
            self.third_category_code,
        ]
        .into_iter()
        .map_while(|code| code)
        .collect()
    }
}

/// The feed publishes causes either as plain codes or as objects carrying
/// the whole category hierarchy.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCause {
    Code(String),
    Categories(RawCauseCategories),
}

fn cause_codes(causes: Vec<RawCause>) -> Vec<String> {
    let mut codes = Vec::new();
    for cause in causes {
        match cause {
            RawCause::Code(code) => codes.push(code),
            RawCause::Categories(categories) if codes.is_empty() => {
                return categories.into_codes()
            }
            RawCause::Categories(_) => break,
        }
    }
    codes
}

impl From<RawTimetableRow> for TimetableRow {
    fn from(raw: RawTimetableRow) -> Self {
        TimetableRow {
            station_code: raw.station_short_code,
            actual_time: raw.actual_time,
            live_estimate_time: raw.live_estimate_time,
            difference_in_minutes: raw.difference_in_minutes,
            causes: cause_codes(raw.causes.unwrap_or_default()),
        }
    }
}

impl TryFrom<Value> for TrainEvent {
    type Error = IngressError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let raw: RawTrainEvent =
            serde_json::from_value(value).map_err(IngressError::InvalidRecord)?;
        let train_number = raw.train_number;
        let timetable_rows = raw
            .time_table_rows
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<RawTimetableRow>(row) {
                Ok(row) => Some(TimetableRow::from(row)),
                Err(err) => {
                    tracing::warn!(%train_number, "Skipping malformed timetable row: {err}");
                    None
                }
            })
            .collect();

        Ok(TrainEvent {
            train_number,
            commuter_line_code: raw.commuter_line_id.unwrap_or_default(),
            cancelled: raw.cancelled.unwrap_or_default(),
            timetable_rows,
        })
    }
}

/// Coerces every record independently, dropping the ones that do not fit.
pub fn decode_records(records: Vec<Value>) -> Vec<TrainEvent> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| match TrainEvent::try_from(record) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(position, "Skipping feed record: {err}");
                None
            }
        })
        .collect()
}

pub fn decode_batch(batch: &str) -> Result<Vec<TrainEvent>, IngressError> {
    let records: Vec<Value> = serde_json::from_str(batch).map_err(IngressError::NotAnArray)?;
    Ok(decode_records(records))
}
