use crate::subscription::{EmailAddress, Subscription};
use shared_kernel::train_number::TrainNumber;
use std::collections::HashMap;

/// One subscriber's interest in a train together with the delay they tolerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watcher {
    pub email: EmailAddress,
    pub threshold_minutes: i32,
}

/// Mapping of train number to everyone watching it, rebuilt for every feed batch.
///
/// Overlapping watch entries of a single subscriber are kept as separate
/// watchers, so such a subscriber is notified once per entry.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionIndex {
    watchers: HashMap<TrainNumber, Vec<Watcher>>,
}

impl SubscriptionIndex {
    #[tracing::instrument(skip(subscriptions), level = "debug")]
    pub fn build(subscriptions: &[Subscription]) -> Self {
        let mut watchers: HashMap<TrainNumber, Vec<Watcher>> = HashMap::new();
        for subscription in subscriptions
            .iter()
            .filter(|subscription| subscription.is_approved())
        {
            for (raw, entry) in subscription
                .watched_trains
                .iter()
                .zip(subscription.watch_entries())
            {
                match entry {
                    Ok(entry) => watchers
                        .entry(entry.train_number)
                        .or_default()
                        .push(Watcher {
                            email: subscription.email.clone(),
                            threshold_minutes: entry.threshold_minutes,
                        }),
                    Err(err) => {
                        tracing::warn!(
                            email = %subscription.email,
                            entry = raw.as_str(),
                            "Skipping watch entry: {err}"
                        );
                    }
                }
            }
        }
        Self { watchers }
    }

    pub fn watchers(&self, train_number: TrainNumber) -> &[Watcher] {
        self.watchers
            .get(&train_number)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_watched(&self, train_number: TrainNumber) -> bool {
        self.watchers.contains_key(&train_number)
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    pub fn train_count(&self) -> usize {
        self.watchers.len()
    }
}
