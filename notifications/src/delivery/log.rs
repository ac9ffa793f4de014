use crate::delivery::DeliveryStrategy;
use crate::Notification;
use async_trait::async_trait;

pub struct LogDeliveryStrategy;

#[async_trait]
impl DeliveryStrategy for LogDeliveryStrategy {
    async fn deliver(&self, notification: Notification) -> anyhow::Result<()> {
        tracing::info!(
            recipient = notification.recipient.as_str(),
            subject = notification.subject.as_str(),
            body = notification.body.as_str(),
            "Dry run, notification not sent"
        );
        Ok(())
    }
}
