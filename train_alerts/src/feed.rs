use crate::engine::MatchingEngine;
use anyhow::Context;
use live_trains::ingress::decode_batch;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub batches: usize,
    pub rejected_batches: usize,
    pub notifications: usize,
}

/// Feeds newline-delimited batches into the engine, one JSON array per line,
/// until the reader is exhausted. Blank lines are ignored. A line that is not
/// UTF-8 or not a JSON array is logged and skipped; only a read error stops
/// the feed.
pub async fn run_feed<R>(engine: &MatchingEngine, mut reader: R) -> anyhow::Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .await
            .context("Failed to read the next feed batch")?;
        if read == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buffer) {
            Ok(line) => line,
            Err(err) => {
                stats.rejected_batches += 1;
                tracing::warn!("Skipping feed batch that is not UTF-8: {err}");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match decode_batch(line) {
            Ok(batch) => {
                stats.batches += 1;
                stats.notifications += engine.handle_batch(batch).await;
            }
            Err(err) => {
                stats.rejected_batches += 1;
                tracing::warn!("Skipping feed batch: {err}");
            }
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use crate::engine::MatchingEngine;
    use crate::feed::{run_feed, FeedStats};
    use crate::messages::MessageComposer;
    use notifications::{Notification, NotificationSink};
    use std::sync::{Arc, Mutex};
    use subscriptions::store::MockSubscriptionStore;
    use subscriptions::subscription::{ApprovalState, EmailAddress, Subscription};
    use train_metadata::TrainMetadata;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Notification>>,
    }

    impl NotificationSink for RecordingSink {
        fn send(&self, notification: Notification) {
            self.sent.lock().unwrap().push(notification);
        }
    }

    fn engine(sink: Arc<RecordingSink>) -> MatchingEngine {
        let mut store = MockSubscriptionStore::new();
        store.expect_list_approved().returning(|| {
            Ok(vec![Subscription {
                email: EmailAddress::try_from("a@x.com").unwrap(),
                watched_trains: vec!["123".to_string()],
                approval_state: ApprovalState::Approved,
            }])
        });
        MatchingEngine::new(
            Arc::new(store),
            Arc::new(TrainMetadata::default()),
            sink,
            MessageComposer::new("http://trains.example"),
        )
    }

    const CANCELLED_BATCH: &str =
        r#"[{"trainNumber":123,"commuterLineID":"I","cancelled":true,"timeTableRows":[]}]"#;

    #[tokio::test]
    async fn test_lines_are_handled_in_order_and_bad_lines_skipped() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(sink.clone());
        let input = format!(
            "{CANCELLED_BATCH}\nnot json\n\n{}\n",
            r#"[{"trainNumber":124,"commuterLineID":"P","cancelled":true,"timeTableRows":[]}]"#
        );

        let stats = run_feed(&engine, input.as_bytes()).await.unwrap();

        assert_eq!(
            stats,
            FeedStats {
                batches: 2,
                rejected_batches: 1,
                notifications: 1,
            }
        );
        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Train I (123) is cancelled!");
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_the_feed() {
        let sink = Arc::new(RecordingSink::default());
        let engine = engine(sink.clone());
        let mut input = b"[\"\xff\"]\n\xff\n".to_vec();
        input.extend_from_slice(CANCELLED_BATCH.as_bytes());

        let stats = run_feed(&engine, input.as_slice()).await.unwrap();

        assert_eq!(
            stats,
            FeedStats {
                batches: 1,
                rejected_batches: 2,
                notifications: 1,
            }
        );
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
    }
}
