//! Watermark polling, the shared primitive behind `watch` and `chat`.

use super::log::MessageLog;
use super::message::Message;
use crate::store::CommsDb;

/// Result of one poll: new messages and the watermark to use next time.
#[derive(Debug, Clone, Default)]
pub struct PollBatch {
    pub messages: Vec<Message>,
    pub watermark: i64,
}

impl PollBatch {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Re-queries the log for anything above a caller-held watermark.
///
/// The poller keeps no state of its own; callers decide when to adopt the
/// returned watermark, so `watch` and `chat` share it with different
/// intervals.
pub struct Poller<'a> {
    log: MessageLog<'a>,
}

impl<'a> Poller<'a> {
    pub fn new(db: &'a CommsDb) -> Self {
        Self {
            log: MessageLog::new(db),
        }
    }

    /// Watermark to start tailing from: the current end of the log.
    pub async fn start(&self) -> crate::Result<i64> {
        self.log.latest_id().await
    }

    pub async fn poll(&self, watermark: i64) -> crate::Result<PollBatch> {
        let messages = self.log.query_since(watermark, None).await?;
        let watermark = messages.last().map(|m| m.id).unwrap_or(watermark);
        Ok(PollBatch {
            messages,
            watermark,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_poll_advances_only_through_returned_batch() {
        let temp = TempDir::new().unwrap();
        let db = CommsDb::open_path(temp.path().join("messages.db"))
            .await
            .unwrap();
        let log = MessageLog::new(&db);
        let poller = Poller::new(&db);

        log.post("Web", "general", "before").await.unwrap();
        let start = poller.start().await.unwrap();

        let empty = poller.poll(start).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.watermark, start);

        log.post("API", "general", "one").await.unwrap();
        let last = log.post("Data", "general", "two").await.unwrap();

        let batch = poller.poll(start).await.unwrap();
        let bodies: Vec<_> = batch.messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two"]);
        assert_eq!(batch.watermark, last);

        // Same watermark in, same answer out.
        let again = poller.poll(start).await.unwrap();
        assert_eq!(again.messages, batch.messages);

        assert!(poller.poll(batch.watermark).await.unwrap().is_empty());
    }

    /// Re-poll like the live views do until something arrives.
    async fn poll_until_nonempty(poller: &Poller<'_>, watermark: i64) -> PollBatch {
        for _ in 0..40 {
            let batch = poller.poll(watermark).await.unwrap();
            if !batch.is_empty() {
                return batch;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        PollBatch {
            messages: Vec::new(),
            watermark,
        }
    }

    #[tokio::test]
    async fn test_poll_sees_writes_from_another_connection() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("messages.db");
        let reader = CommsDb::open_path(&path).await.unwrap();
        let writer = CommsDb::open_path(&path).await.unwrap();
        let writer_log = MessageLog::new(&writer);

        writer_log.post("Data", "general", "already there").await.unwrap();

        let poller = Poller::new(&reader);
        let start = poller.start().await.unwrap();

        let first = writer_log
            .post("Web", "general", "from elsewhere")
            .await
            .unwrap();
        let second = writer_log.post("API", "general", "and again").await.unwrap();

        let mut watermark = start;
        let mut seen = Vec::new();
        while watermark < second {
            let batch = poll_until_nonempty(&poller, watermark).await;
            assert!(!batch.is_empty(), "writes never became visible");
            seen.extend(batch.messages.into_iter().map(|m| m.id));
            watermark = batch.watermark;
        }

        assert_eq!(seen, vec![first, second]);
        assert_eq!(watermark, second);
    }

    #[tokio::test]
    async fn test_latest_id_does_not_pin_a_stale_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("messages.db");
        let reader = CommsDb::open_path(&path).await.unwrap();
        let writer = CommsDb::open_path(&path).await.unwrap();
        let reader_log = MessageLog::new(&reader);

        assert_eq!(reader_log.latest_id().await.unwrap(), 0);
        let id = MessageLog::new(&writer)
            .post("Web", "general", "hello")
            .await
            .unwrap();

        let rows = reader_log.query_since(0, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(reader_log.latest_id().await.unwrap(), id);
    }
}
