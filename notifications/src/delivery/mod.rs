pub mod email;
pub mod log;

use crate::Notification;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()>;
}
