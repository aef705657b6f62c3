use anyhow::Result;
use chrono::{DateTime, Utc};

use super::entity::QueueIntervalStats;

/// Storage contract for the stats table. The composite key is
/// (queue_id, media_type, interval_start).
#[async_trait::async_trait]
pub trait QueueStatsRepository: Clone + Send + Sync {
    async fn exists(
        &self,
        queue_id: &str,
        media_type: &str,
        interval_start: DateTime<Utc>,
    ) -> Result<bool>;

    async fn insert(&self, row: &QueueIntervalStats) -> Result<()>;

    /// Rewrites every non-key column, queue_name included.
    async fn update(&self, row: &QueueIntervalStats) -> Result<()>;
}
