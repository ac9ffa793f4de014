use crate::store::SubscriptionStore;
use crate::subscription::{Subscription, SubscriptionRecord};
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;

/// Store backed by a JSON array of subscription records that some other
/// process maintains. The file is re-read on every call, so edits become
/// visible on the next feed batch.
#[derive(Debug, Clone)]
pub struct JsonFileSubscriptionStore {
    path: PathBuf,
}

impl JsonFileSubscriptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_records(&self) -> anyhow::Result<Vec<SubscriptionRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "Subscriptions file does not exist");
                return Ok(vec![]);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid subscriptions file {}", self.path.display()))
    }
}

#[async_trait]
impl SubscriptionStore for JsonFileSubscriptionStore {
    #[tracing::instrument(err, skip(self), level = "debug")]
    async fn list_approved(&self) -> anyhow::Result<Vec<Subscription>> {
        let records = self.read_records().await?;
        let subscriptions = records
            .into_iter()
            .filter_map(|record| {
                let email = record.email.clone();
                Subscription::try_from(record)
                    .map_err(|err| tracing::warn!(email = %email, "Skipping subscription record: {err}"))
                    .ok()
            })
            .filter(Subscription::is_approved)
            .collect();
        Ok(subscriptions)
    }
}
