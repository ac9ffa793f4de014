use anyhow::Context;
use notifications::config::{DeliveryMode, EmailConfig};
use serde::Deserialize;
use shared_kernel::configuration::config;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Public address of the subscription site, used in unsubscribe links.
    pub server_name: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetadataSettings {
    pub host: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubscriptionSettings {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email: EmailConfig,
    pub metadata: MetadataSettings,
    pub subscriptions: SubscriptionSettings,
    #[serde(default)]
    pub delivery: DeliveryMode,
}

impl Settings {
    pub fn parse() -> anyhow::Result<Settings> {
        config::<Settings>().context("Failed to deserialize settings to train_alerts settings")
    }
}
