use crate::delivery::DeliveryStrategy;
use crate::{Notification, NotificationSink};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinHandle, JoinSet};

/// Hands notifications to a background worker over an unbounded channel.
/// Cloning shares the same worker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: UnboundedSender<Notification>,
}

/// Handle on the background worker. Draining waits until every dispatcher
/// clone is dropped and all in-flight deliveries have finished.
pub struct DispatchWorker {
    handle: JoinHandle<()>,
}

impl NotificationDispatcher {
    /// Spawns the worker on the current tokio runtime.
    pub fn start(strategy: Arc<dyn DeliveryStrategy>) -> (Self, DispatchWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(strategy, receiver));
        (Self { sender }, DispatchWorker { handle })
    }
}

impl NotificationSink for NotificationDispatcher {
    fn send(&self, notification: Notification) {
        if let Err(err) = self.sender.send(notification) {
            let notification = err.0;
            tracing::error!(
                recipient = notification.recipient.as_str(),
                "Dispatcher is closed, dropping notification {}",
                notification.subject
            );
        }
    }
}

impl DispatchWorker {
    pub async fn drain(self) -> anyhow::Result<()> {
        self.handle
            .await
            .context("Notification worker stopped abnormally")
    }
}

async fn deliver(strategy: Arc<dyn DeliveryStrategy>, notification: Notification) {
    let recipient = notification.recipient.clone();
    let subject = notification.subject.clone();
    if let Err(err) = strategy.deliver(notification).await {
        tracing::error!(
            recipient = recipient.as_str(),
            "Could not send notification with subject {subject}: {err:?}"
        );
    }
}

async fn run_worker(
    strategy: Arc<dyn DeliveryStrategy>,
    mut receiver: UnboundedReceiver<Notification>,
) {
    let mut deliveries = JoinSet::new();
    loop {
        tokio::select! {
            notification = receiver.recv() => match notification {
                Some(notification) => {
                    deliveries.spawn(deliver(strategy.clone(), notification));
                }
                None => break,
            },
            Some(result) = deliveries.join_next(), if !deliveries.is_empty() => {
                if let Err(err) = result {
                    tracing::error!("Notification delivery task failed: {err}");
                }
            }
        }
    }
    while let Some(result) = deliveries.join_next().await {
        if let Err(err) = result {
            tracing::error!("Notification delivery task failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::delivery::MockDeliveryStrategy;
    use crate::dispatcher::NotificationDispatcher;
    use crate::{Notification, NotificationSink};
    use anyhow::anyhow;
    use std::sync::Arc;

    fn notification(recipient: &str) -> Notification {
        Notification {
            recipient: recipient.to_string(),
            subject: "subject".to_string(),
            body: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_every_notification_is_delivered() {
        let mut strategy = MockDeliveryStrategy::new();
        strategy.expect_deliver().times(3).returning(|_| Ok(()));

        let (dispatcher, worker) = NotificationDispatcher::start(Arc::new(strategy));
        for recipient in ["a@x.com", "b@x.com", "a@x.com"] {
            dispatcher.send(notification(recipient));
        }
        drop(dispatcher);
        worker.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_stop_the_worker() {
        let mut strategy = MockDeliveryStrategy::new();
        strategy
            .expect_deliver()
            .withf(|notification| notification.recipient == "broken@x.com")
            .times(1)
            .returning(|_| Err(anyhow!("mail api is down")));
        strategy
            .expect_deliver()
            .withf(|notification| notification.recipient == "a@x.com")
            .times(1)
            .returning(|_| Ok(()));

        let (dispatcher, worker) = NotificationDispatcher::start(Arc::new(strategy));
        dispatcher.send(notification("broken@x.com"));
        dispatcher.send(notification("a@x.com"));
        drop(dispatcher);
        worker.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_sending_after_the_worker_stopped_does_not_panic() {
        let strategy = MockDeliveryStrategy::new();
        let (dispatcher, worker) = NotificationDispatcher::start(Arc::new(strategy));
        worker.handle.abort();
        let _ = worker.handle.await;
        dispatcher.send(notification("a@x.com"));
    }
}
