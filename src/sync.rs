use anyhow::Result;
use tracing::debug;

use crate::domain::{entity::QueueIntervalStats, repository::QueueStatsRepository};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub inserted: u64,
    pub updated: u64,
}

/// Reconciles flattened rows against the stats table: update when the
/// composite key already exists, insert otherwise. One existence check and
/// one write per row; the first error aborts the batch.
#[derive(Clone, Debug)]
pub struct StatsWriter<R>
where
    R: QueueStatsRepository,
{
    repo: R,
}

impl<R> StatsWriter<R>
where
    R: QueueStatsRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn write_all(&self, rows: &[QueueIntervalStats]) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        for row in rows {
            let exists = self
                .repo
                .exists(&row.queue_id, &row.media_type, row.interval_start)
                .await?;

            if exists {
                self.repo.update(row).await?;
                summary.updated += 1;
            } else {
                self.repo.insert(row).await?;
                summary.inserted += 1;
            }

            debug!(
                queue_id = row.queue_id.as_str(),
                media_type = row.media_type.as_str(),
                exists,
                "row written"
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Key = (String, String, DateTime<Utc>);

    #[derive(Clone, Default)]
    struct InMemoryRepository {
        rows: Arc<Mutex<HashMap<Key, QueueIntervalStats>>>,
        inserts: Arc<Mutex<u64>>,
        updates: Arc<Mutex<u64>>,
    }

    impl InMemoryRepository {
        fn key(row: &QueueIntervalStats) -> Key {
            (row.queue_id.clone(), row.media_type.clone(), row.interval_start)
        }

        fn get(&self, key: &Key) -> Option<QueueIntervalStats> {
            self.rows.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait::async_trait]
    impl QueueStatsRepository for InMemoryRepository {
        async fn exists(
            &self,
            queue_id: &str,
            media_type: &str,
            interval_start: DateTime<Utc>,
        ) -> Result<bool> {
            let key = (queue_id.to_string(), media_type.to_string(), interval_start);
            Ok(self.rows.lock().unwrap().contains_key(&key))
        }

        async fn insert(&self, row: &QueueIntervalStats) -> Result<()> {
            let key = Self::key(row);
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&key) {
                bail!("duplicate key");
            }
            rows.insert(key, row.clone());
            *self.inserts.lock().unwrap() += 1;
            Ok(())
        }

        async fn update(&self, row: &QueueIntervalStats) -> Result<()> {
            let key = Self::key(row);
            let mut rows = self.rows.lock().unwrap();
            if !rows.contains_key(&key) {
                bail!("missing key");
            }
            rows.insert(key, row.clone());
            *self.updates.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn row(queue_id: &str, media_type: &str, n_offered: i64) -> QueueIntervalStats {
        QueueIntervalStats {
            queue_id: queue_id.to_string(),
            media_type: media_type.to_string(),
            interval_start: Utc.with_ymd_and_hms(2024, 3, 5, 13, 30, 0).unwrap(),
            queue_name: queue_id.to_string(),
            n_offered,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn new_keys_are_inserted() {
        let repo = InMemoryRepository::default();
        let writer = StatsWriter::new(repo.clone());

        let summary = writer
            .write_all(&[row("q-1", "voice", 5), row("q-1", "chat", 2)])
            .await
            .unwrap();

        assert_eq!(summary, WriteSummary { inserted: 2, updated: 0 });
        assert_eq!(*repo.inserts.lock().unwrap(), 2);
        assert_eq!(*repo.updates.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn existing_keys_are_updated_not_inserted() {
        let repo = InMemoryRepository::default();
        let writer = StatsWriter::new(repo.clone());

        writer.write_all(&[row("q-1", "voice", 5)]).await.unwrap();
        let summary = writer.write_all(&[row("q-1", "voice", 9)]).await.unwrap();

        assert_eq!(summary, WriteSummary { inserted: 0, updated: 1 });

        let key = (
            "q-1".to_string(),
            "voice".to_string(),
            Utc.with_ymd_and_hms(2024, 3, 5, 13, 30, 0).unwrap(),
        );
        assert_eq!(repo.get(&key).unwrap().n_offered, 9);
    }

    #[derive(Clone)]
    struct FailingRepository {
        inner: InMemoryRepository,
        fail_on: String,
    }

    #[async_trait::async_trait]
    impl QueueStatsRepository for FailingRepository {
        async fn exists(
            &self,
            queue_id: &str,
            media_type: &str,
            interval_start: DateTime<Utc>,
        ) -> Result<bool> {
            self.inner.exists(queue_id, media_type, interval_start).await
        }

        async fn insert(&self, row: &QueueIntervalStats) -> Result<()> {
            if row.queue_id == self.fail_on {
                bail!("connection reset");
            }
            self.inner.insert(row).await
        }

        async fn update(&self, row: &QueueIntervalStats) -> Result<()> {
            if row.queue_id == self.fail_on {
                bail!("connection reset");
            }
            self.inner.update(row).await
        }
    }

    #[tokio::test]
    async fn first_error_aborts_the_rest_of_the_batch() {
        let inner = InMemoryRepository::default();
        let writer = StatsWriter::new(FailingRepository {
            inner: inner.clone(),
            fail_on: "q-2".to_string(),
        });

        let err = writer
            .write_all(&[
                row("q-1", "voice", 1),
                row("q-2", "voice", 2),
                row("q-3", "voice", 3),
            ])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert_eq!(*inner.inserts.lock().unwrap(), 1);

        let after_failure = (
            "q-3".to_string(),
            "voice".to_string(),
            Utc.with_ymd_and_hms(2024, 3, 5, 13, 30, 0).unwrap(),
        );
        assert!(inner.get(&after_failure).is_none());
    }

    #[tokio::test]
    async fn mixed_batch_routes_each_row() {
        let repo = InMemoryRepository::default();
        let writer = StatsWriter::new(repo.clone());

        writer.write_all(&[row("q-1", "voice", 5)]).await.unwrap();
        let summary = writer
            .write_all(&[row("q-1", "voice", 6), row("q-2", "email", 1)])
            .await
            .unwrap();

        assert_eq!(summary, WriteSummary { inserted: 1, updated: 1 });
    }
}
