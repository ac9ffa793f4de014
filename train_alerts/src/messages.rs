use crate::engine::Alert;
use notifications::Notification;
use shared_kernel::train_number::TrainNumber;
use subscriptions::index::Watcher;
use subscriptions::watch_entry::WatchEntry;
use url::form_urlencoded;

/// Turns alerts into the subject and body users receive.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    server_name: String,
}

impl MessageComposer {
    pub fn new(server_name: &str) -> Self {
        Self {
            server_name: server_name.trim_end_matches('/').to_owned(),
        }
    }

    pub fn compose(&self, alert: &Alert) -> Notification {
        match alert {
            Alert::Cancelled {
                train_number,
                line,
                watcher,
            } => {
                let subject = format!("Train {line} ({train_number}) is cancelled!");
                let body = format!(
                    "{subject}{}",
                    self.unsubscribe_footer(watcher, *train_number)
                );
                Notification {
                    recipient: watcher.email.inner(),
                    subject,
                    body,
                }
            }
            Alert::Late {
                train_number,
                line,
                watcher,
                actual_difference,
                estimate_difference,
                station,
                cause,
            } => {
                let subject = format!(
                    "Train {line} ({train_number}) is {actual_difference} minutes late @ {station}"
                );
                let body = format!(
                    "Train {line} ({train_number}) is {actual_difference} minutes late, \
                     which exceeds your threshold of {} minutes. \
                     Latest live estimate difference: {estimate_difference} minutes. \
                     Cause of delay:\n\n{cause}{}",
                    watcher.threshold_minutes,
                    self.unsubscribe_footer(watcher, *train_number)
                );
                Notification {
                    recipient: watcher.email.inner(),
                    subject,
                    body,
                }
            }
        }
    }

    fn unsubscribe_footer(&self, watcher: &Watcher, train_number: TrainNumber) -> String {
        let entry = WatchEntry::new(train_number, watcher.threshold_minutes);
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("email", watcher.email.as_ref())
            .append_pair("trainId", &entry.encode())
            .finish();
        format!(
            "\n\nStop following this train: {}/trains/remove?{query}",
            self.server_name
        )
    }
}
