pub mod in_memory;
pub mod json_file;

use crate::subscription::Subscription;
use async_trait::async_trait;
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("No subscription found for {0}")]
    NotFound(String),
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("Approval token does not match the pending subscription of {0}")]
    InvalidToken(String),
}

/// Read side of subscription persistence. The engine lists the approved
/// subscriptions once per feed batch.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_approved(&self) -> anyhow::Result<Vec<Subscription>>;
}
