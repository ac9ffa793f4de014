pub mod config;
pub mod delivery;
pub mod dispatcher;

/// A formatted message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Fire-and-forget submission of notifications. Implementations must not
/// block the caller nor report delivery failures back to it.
pub trait NotificationSink: Send + Sync {
    fn send(&self, notification: Notification);
}
