use crate::watch_entry::{WatchEntry, WatchEntryError};
use serde::{Deserialize, Serialize};

shared_kernel::non_empty_string!(EmailAddress);
shared_kernel::string_key!(ApprovalToken);

impl ApprovalToken {
    pub fn generate() -> Self {
        ApprovalToken::new(uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalState {
    PendingApproval(ApprovalToken),
    Approved,
}

impl ApprovalState {
    pub fn is_approved(&self) -> bool {
        matches!(self, ApprovalState::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub email: EmailAddress,
    /// Raw watch entries as submitted, parsed lazily when matching.
    pub watched_trains: Vec<String>,
    pub approval_state: ApprovalState,
}

impl Subscription {
    pub fn is_approved(&self) -> bool {
        self.approval_state.is_approved()
    }

    pub fn watch_entries(&self) -> impl Iterator<Item = Result<WatchEntry, WatchEntryError>> + '_ {
        self.watched_trains.iter().map(|entry| entry.parse())
    }
}

/// On-disk shape of a subscription record. An absent or empty
/// `approvalPending` marks an approved subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub email: String,
    #[serde(default)]
    pub watched_trains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_pending: Option<String>,
}

impl TryFrom<SubscriptionRecord> for Subscription {
    type Error = String;

    fn try_from(record: SubscriptionRecord) -> Result<Self, Self::Error> {
        let email = EmailAddress::try_from(record.email)?;
        let approval_state = match record.approval_pending {
            Some(token) if !token.is_empty() => {
                ApprovalState::PendingApproval(ApprovalToken::new(token))
            }
            _ => ApprovalState::Approved,
        };
        Ok(Subscription {
            email,
            watched_trains: record.watched_trains,
            approval_state,
        })
    }
}

impl From<Subscription> for SubscriptionRecord {
    fn from(subscription: Subscription) -> Self {
        let approval_pending = match subscription.approval_state {
            ApprovalState::PendingApproval(token) => Some(token.inner()),
            ApprovalState::Approved => None,
        };
        SubscriptionRecord {
            email: subscription.email.inner(),
            watched_trains: subscription.watched_trains,
            approval_pending,
        }
    }
}
