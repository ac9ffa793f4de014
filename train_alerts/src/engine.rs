use crate::messages::MessageComposer;
use live_trains::event::{TimetableRow, TrainEvent};
use live_trains::reducer;
use notifications::NotificationSink;
use shared_kernel::train_number::TrainNumber;
use std::sync::Arc;
use subscriptions::index::{SubscriptionIndex, Watcher};
use subscriptions::store::SubscriptionStore;
use thiserror::Error;
use train_metadata::TrainMetadata;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("timetable row at {station} has no differenceInMinutes")]
    MissingDifference { station: String },
    #[error("train is late but has no actual observation")]
    NoActualObservation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Cancelled {
        train_number: TrainNumber,
        line: String,
        watcher: Watcher,
    },
    Late {
        train_number: TrainNumber,
        line: String,
        watcher: Watcher,
        actual_difference: i32,
        estimate_difference: i32,
        station: String,
        cause: String,
    },
}

/// The selected row's delay, or zero when no row was selected.
fn difference(row: Option<&TimetableRow>) -> Result<i32, MatchError> {
    match row {
        None => Ok(0),
        Some(row) => row
            .difference_in_minutes
            .ok_or_else(|| MatchError::MissingDifference {
                station: row.station_code.clone(),
            }),
    }
}

pub struct MatchingEngine {
    store: Arc<dyn SubscriptionStore>,
    metadata: Arc<TrainMetadata>,
    sink: Arc<dyn NotificationSink>,
    messages: MessageComposer,
}

impl MatchingEngine {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        metadata: Arc<TrainMetadata>,
        sink: Arc<dyn NotificationSink>,
        messages: MessageComposer,
    ) -> Self {
        Self {
            store,
            metadata,
            sink,
            messages,
        }
    }

    /// Matches one feed batch against the current approved subscriptions and
    /// submits a notification per alert. Returns how many were submitted.
    ///
    /// Nothing in here fails the caller: a store error skips the batch and a
    /// bad event only skips that event.
    #[tracing::instrument(skip_all, fields(events = batch.len()), level = "info")]
    pub async fn handle_batch(&self, batch: Vec<TrainEvent>) -> usize {
        let subscriptions = match self.store.list_approved().await {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                tracing::error!("Could not list subscriptions, skipping batch: {err:?}");
                return 0;
            }
        };
        let index = SubscriptionIndex::build(&subscriptions);
        if index.is_empty() {
            tracing::debug!("No trains are watched, skipping batch");
            return 0;
        }
        tracing::debug!(watched_trains = index.train_count(), "Matching batch");
        let alerts = self.match_batch(&index, &batch);
        let submitted = alerts.len();
        for alert in alerts {
            self.sink.send(self.messages.compose(&alert));
        }
        submitted
    }

    pub fn match_batch(&self, index: &SubscriptionIndex, batch: &[TrainEvent]) -> Vec<Alert> {
        batch
            .iter()
            .filter(|event| index.is_watched(event.train_number))
            .flat_map(|event| {
                self.match_event(index.watchers(event.train_number), event)
                    .unwrap_or_else(|err| {
                        tracing::error!(
                            train_number = %event.train_number,
                            "Could not process train event: {err}"
                        );
                        vec![]
                    })
            })
            .collect()
    }

    fn match_event(&self, watchers: &[Watcher], event: &TrainEvent) -> Result<Vec<Alert>, MatchError> {
        let train_number = event.train_number;
        if event.cancelled {
            return Ok(watchers
                .iter()
                .map(|watcher| {
                    tracing::info!(
                        %train_number,
                        email = %watcher.email,
                        "Reporting cancelled train"
                    );
                    Alert::Cancelled {
                        train_number,
                        line: event.commuter_line_code.clone(),
                        watcher: watcher.clone(),
                    }
                })
                .collect());
        }

        let reduced = reducer::reduce(&event.timetable_rows);
        let actual_difference = difference(reduced.latest_actual)?;
        let estimate_difference = difference(reduced.latest_estimate)?;

        let late_watchers = watchers
            .iter()
            .filter(|watcher| watcher.threshold_minutes < actual_difference)
            .collect::<Vec<_>>();
        if late_watchers.is_empty() {
            return Ok(vec![]);
        }

        let actual = reduced
            .latest_actual
            .ok_or(MatchError::NoActualObservation)?;
        let station = self.metadata.stations.name_for(&actual.station_code);
        let cause = self.metadata.causes.resolve(&actual.causes);

        Ok(late_watchers
            .into_iter()
            .map(|watcher| {
                tracing::info!(
                    %train_number,
                    email = %watcher.email,
                    actual_difference,
                    estimate_difference,
                    "Reporting late train"
                );
                Alert::Late {
                    train_number,
                    line: event.commuter_line_code.clone(),
                    watcher: watcher.clone(),
                    actual_difference,
                    estimate_difference,
                    station: station.clone(),
                    cause: cause.clone(),
                }
            })
            .collect())
    }
}
