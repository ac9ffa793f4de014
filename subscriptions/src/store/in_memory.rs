use crate::store::{SubscriptionError, SubscriptionStore};
use crate::subscription::{ApprovalState, ApprovalToken, EmailAddress, Subscription};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Subscription store with the two-phase approval workflow: a new
/// subscription stays pending until the emailed token comes back.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<BTreeMap<EmailAddress, Subscription>>,
}

fn parse_email(email: &str) -> Result<EmailAddress, SubscriptionError> {
    EmailAddress::try_from(email).map_err(|_| SubscriptionError::InvalidEmail(email.to_owned()))
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending subscription, or replaces the watch list of an
    /// existing one while keeping its approval state.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn subscribe(
        &self,
        email: &str,
        watched_trains: Vec<String>,
    ) -> Result<Subscription, SubscriptionError> {
        let email = parse_email(email)?;
        let mut subscriptions = self.subscriptions.write().await;
        let subscription = match subscriptions.get_mut(&email) {
            Some(existing) => {
                tracing::info!("Updating existing subscriber with {watched_trains:?}");
                existing.watched_trains = watched_trains;
                existing.clone()
            }
            None => {
                let token = ApprovalToken::generate();
                tracing::info!("Subscriber pending approval with token {token}");
                let subscription = Subscription {
                    email: email.clone(),
                    watched_trains,
                    approval_state: ApprovalState::PendingApproval(token),
                };
                subscriptions.insert(email, subscription.clone());
                subscription
            }
        };
        Ok(subscription)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn approve(&self, email: &str, token: &str) -> Result<(), SubscriptionError> {
        let email = parse_email(email)?;
        let mut subscriptions = self.subscriptions.write().await;
        let subscription = subscriptions
            .get_mut(&email)
            .ok_or_else(|| SubscriptionError::NotFound(email.inner()))?;
        match &subscription.approval_state {
            ApprovalState::Approved => Ok(()),
            ApprovalState::PendingApproval(pending) if pending == token => {
                subscription.approval_state = ApprovalState::Approved;
                Ok(())
            }
            ApprovalState::PendingApproval(_) => Err(SubscriptionError::InvalidToken(email.inner())),
        }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn unsubscribe(&self, email: &str) -> Result<Subscription, SubscriptionError> {
        let email = parse_email(email)?;
        self.subscriptions
            .write()
            .await
            .remove(&email)
            .ok_or_else(|| SubscriptionError::NotFound(email.inner()))
    }

    /// Removes the given raw watch entries, returning how many were removed.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn remove_watch_entries(
        &self,
        email: &str,
        entries: &[String],
    ) -> Result<usize, SubscriptionError> {
        let email = parse_email(email)?;
        let mut subscriptions = self.subscriptions.write().await;
        let subscription = subscriptions
            .get_mut(&email)
            .ok_or_else(|| SubscriptionError::NotFound(email.inner()))?;
        let mut removed = 0;
        for entry in entries {
            match subscription
                .watched_trains
                .iter()
                .position(|watched| watched == entry)
            {
                Some(position) => {
                    subscription.watched_trains.remove(position);
                    removed += 1;
                }
                None => tracing::info!("Could not remove watch entry {entry}"),
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn list_approved(&self) -> anyhow::Result<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|subscription| subscription.is_approved())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::store::in_memory::InMemorySubscriptionStore;
    use crate::store::{SubscriptionError, SubscriptionStore};
    use crate::subscription::ApprovalState;

    fn pending_token(state: &ApprovalState) -> String {
        match state {
            ApprovalState::PendingApproval(token) => token.inner(),
            ApprovalState::Approved => panic!("expected a pending subscription"),
        }
    }

    #[tokio::test]
    async fn test_new_subscriptions_are_pending_until_approved() {
        let store = InMemorySubscriptionStore::new();
        let subscription = store
            .subscribe("a@x.com", vec!["123:10".to_string()])
            .await
            .unwrap();
        assert!(store.list_approved().await.unwrap().is_empty());

        let token = pending_token(&subscription.approval_state);
        store.approve("a@x.com", &token).await.unwrap();

        let approved = store.list_approved().await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].watched_trains, vec!["123:10"]);
    }

    #[tokio::test]
    async fn test_wrong_token_does_not_approve() {
        let store = InMemorySubscriptionStore::new();
        store.subscribe("a@x.com", vec!["1".to_string()]).await.unwrap();

        let result = store.approve("a@x.com", "not-the-token").await;
        assert!(matches!(result, Err(SubscriptionError::InvalidToken(_))));
        assert!(store.list_approved().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resubscribing_keeps_the_approval_state() {
        let store = InMemorySubscriptionStore::new();
        let subscription = store.subscribe("a@x.com", vec!["1".to_string()]).await.unwrap();
        let token = pending_token(&subscription.approval_state);
        store.approve("a@x.com", &token).await.unwrap();

        let updated = store
            .subscribe("a@x.com", vec!["2:7".to_string()])
            .await
            .unwrap();
        assert!(updated.is_approved());
        assert_eq!(store.list_approved().await.unwrap()[0].watched_trains, vec!["2:7"]);
    }

    #[tokio::test]
    async fn test_emails_are_case_sensitive() {
        let store = InMemorySubscriptionStore::new();
        store.subscribe("a@x.com", vec![]).await.unwrap();
        let result = store.unsubscribe("A@x.com").await;
        assert!(matches!(result, Err(SubscriptionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_email_is_rejected() {
        let store = InMemorySubscriptionStore::new();
        let result = store.subscribe("", vec!["1".to_string()]).await;
        assert!(matches!(result, Err(SubscriptionError::InvalidEmail(_))));
    }

    #[tokio::test]
    async fn test_removing_watch_entries() {
        let store = InMemorySubscriptionStore::new();
        store
            .subscribe("a@x.com", vec!["1".to_string(), "2:3".to_string()])
            .await
            .unwrap();

        let removed = store
            .remove_watch_entries("a@x.com", &["2:3".to_string(), "9".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);

        store.unsubscribe("a@x.com").await.unwrap();
        assert!(matches!(
            store.remove_watch_entries("a@x.com", &[]).await,
            Err(SubscriptionError::NotFound(_))
        ));
    }
}
