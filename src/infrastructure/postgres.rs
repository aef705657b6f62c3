use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{entity::QueueIntervalStats, repository::QueueStatsRepository};

#[derive(Clone, Debug)]
pub struct PgQueueStatsRepository {
    pool: PgPool,
}

impl PgQueueStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the stats table and its composite unique index if they are
    /// not there yet. Real errors propagate.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queue_interval_stats (
                queue_id TEXT NOT NULL,
                queue_name TEXT NOT NULL,
                media_type TEXT NOT NULL,
                interval_start TIMESTAMPTZ NOT NULL,
                n_error BIGINT NOT NULL,
                n_offered BIGINT NOT NULL,
                n_outbound_abandoned BIGINT NOT NULL,
                n_outbound_attempted BIGINT NOT NULL,
                n_outbound_connected BIGINT NOT NULL,
                n_transferred BIGINT NOT NULL,
                n_over_sla BIGINT NOT NULL,
                t_abandon DOUBLE PRECISION NOT NULL,
                mt_abandon DOUBLE PRECISION NOT NULL,
                n_abandon BIGINT NOT NULL,
                t_acd DOUBLE PRECISION NOT NULL,
                mt_acd DOUBLE PRECISION NOT NULL,
                n_acd BIGINT NOT NULL,
                t_acw DOUBLE PRECISION NOT NULL,
                mt_acw DOUBLE PRECISION NOT NULL,
                n_acw BIGINT NOT NULL,
                t_agent_response_time DOUBLE PRECISION NOT NULL,
                mt_agent_response_time DOUBLE PRECISION NOT NULL,
                n_agent_response_time BIGINT NOT NULL,
                t_answered DOUBLE PRECISION NOT NULL,
                mt_answered DOUBLE PRECISION NOT NULL,
                n_answered BIGINT NOT NULL,
                t_handle DOUBLE PRECISION NOT NULL,
                mt_handle DOUBLE PRECISION NOT NULL,
                n_handle BIGINT NOT NULL,
                t_held DOUBLE PRECISION NOT NULL,
                mt_held DOUBLE PRECISION NOT NULL,
                n_held BIGINT NOT NULL,
                t_held_complete DOUBLE PRECISION NOT NULL,
                mt_held_complete DOUBLE PRECISION NOT NULL,
                n_held_complete BIGINT NOT NULL,
                t_ivr DOUBLE PRECISION NOT NULL,
                mt_ivr DOUBLE PRECISION NOT NULL,
                n_ivr BIGINT NOT NULL,
                t_talk DOUBLE PRECISION NOT NULL,
                mt_talk DOUBLE PRECISION NOT NULL,
                n_talk BIGINT NOT NULL,
                t_talk_complete DOUBLE PRECISION NOT NULL,
                mt_talk_complete DOUBLE PRECISION NOT NULL,
                n_talk_complete BIGINT NOT NULL,
                t_user_response_time DOUBLE PRECISION NOT NULL,
                mt_user_response_time DOUBLE PRECISION NOT NULL,
                n_user_response_time BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("create queue_interval_stats")?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS queue_interval_stats_key
            ON queue_interval_stats (queue_id, media_type, interval_start)
            "#,
        )
        .execute(&self.pool)
        .await
        .context("create queue_interval_stats_key")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl QueueStatsRepository for PgQueueStatsRepository {
    async fn exists(
        &self,
        queue_id: &str,
        media_type: &str,
        interval_start: DateTime<Utc>,
    ) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT queue_id FROM queue_interval_stats
            WHERE queue_id = $1 AND media_type = $2 AND interval_start = $3
            "#,
        )
        .bind(queue_id)
        .bind(media_type)
        .bind(interval_start)
        .fetch_optional(&self.pool)
        .await
        .context("QueueStatsRepository::exists")?;

        Ok(row.is_some())
    }

    async fn insert(&self, row: &QueueIntervalStats) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_interval_stats (
                queue_id, queue_name, media_type, interval_start,
                n_error, n_offered, n_outbound_abandoned, n_outbound_attempted,
                n_outbound_connected, n_transferred, n_over_sla,
                t_abandon, mt_abandon, n_abandon,
                t_acd, mt_acd, n_acd,
                t_acw, mt_acw, n_acw,
                t_agent_response_time, mt_agent_response_time, n_agent_response_time,
                t_answered, mt_answered, n_answered,
                t_handle, mt_handle, n_handle,
                t_held, mt_held, n_held,
                t_held_complete, mt_held_complete, n_held_complete,
                t_ivr, mt_ivr, n_ivr,
                t_talk, mt_talk, n_talk,
                t_talk_complete, mt_talk_complete, n_talk_complete,
                t_user_response_time, mt_user_response_time, n_user_response_time
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                $27, $28, $29, $30, $31, $32, $33, $34, $35, $36, $37, $38,
                $39, $40, $41, $42, $43, $44, $45, $46, $47
            )
            "#,
        )
        .bind(&row.queue_id)
        .bind(&row.queue_name)
        .bind(&row.media_type)
        .bind(row.interval_start)
        .bind(row.n_error)
        .bind(row.n_offered)
        .bind(row.n_outbound_abandoned)
        .bind(row.n_outbound_attempted)
        .bind(row.n_outbound_connected)
        .bind(row.n_transferred)
        .bind(row.n_over_sla)
        .bind(row.t_abandon)
        .bind(row.mt_abandon)
        .bind(row.n_abandon)
        .bind(row.t_acd)
        .bind(row.mt_acd)
        .bind(row.n_acd)
        .bind(row.t_acw)
        .bind(row.mt_acw)
        .bind(row.n_acw)
        .bind(row.t_agent_response_time)
        .bind(row.mt_agent_response_time)
        .bind(row.n_agent_response_time)
        .bind(row.t_answered)
        .bind(row.mt_answered)
        .bind(row.n_answered)
        .bind(row.t_handle)
        .bind(row.mt_handle)
        .bind(row.n_handle)
        .bind(row.t_held)
        .bind(row.mt_held)
        .bind(row.n_held)
        .bind(row.t_held_complete)
        .bind(row.mt_held_complete)
        .bind(row.n_held_complete)
        .bind(row.t_ivr)
        .bind(row.mt_ivr)
        .bind(row.n_ivr)
        .bind(row.t_talk)
        .bind(row.mt_talk)
        .bind(row.n_talk)
        .bind(row.t_talk_complete)
        .bind(row.mt_talk_complete)
        .bind(row.n_talk_complete)
        .bind(row.t_user_response_time)
        .bind(row.mt_user_response_time)
        .bind(row.n_user_response_time)
        .execute(&self.pool)
        .await
        .context("QueueStatsRepository::insert")?;

        Ok(())
    }

    async fn update(&self, row: &QueueIntervalStats) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queue_interval_stats SET
                queue_name = $1,
                n_error = $2, n_offered = $3, n_outbound_abandoned = $4,
                n_outbound_attempted = $5, n_outbound_connected = $6,
                n_transferred = $7, n_over_sla = $8,
                t_abandon = $9, mt_abandon = $10, n_abandon = $11,
                t_acd = $12, mt_acd = $13, n_acd = $14,
                t_acw = $15, mt_acw = $16, n_acw = $17,
                t_agent_response_time = $18, mt_agent_response_time = $19, n_agent_response_time = $20,
                t_answered = $21, mt_answered = $22, n_answered = $23,
                t_handle = $24, mt_handle = $25, n_handle = $26,
                t_held = $27, mt_held = $28, n_held = $29,
                t_held_complete = $30, mt_held_complete = $31, n_held_complete = $32,
                t_ivr = $33, mt_ivr = $34, n_ivr = $35,
                t_talk = $36, mt_talk = $37, n_talk = $38,
                t_talk_complete = $39, mt_talk_complete = $40, n_talk_complete = $41,
                t_user_response_time = $42, mt_user_response_time = $43, n_user_response_time = $44
            WHERE queue_id = $45 AND media_type = $46 AND interval_start = $47
            "#,
        )
        .bind(&row.queue_name)
        .bind(row.n_error)
        .bind(row.n_offered)
        .bind(row.n_outbound_abandoned)
        .bind(row.n_outbound_attempted)
        .bind(row.n_outbound_connected)
        .bind(row.n_transferred)
        .bind(row.n_over_sla)
        .bind(row.t_abandon)
        .bind(row.mt_abandon)
        .bind(row.n_abandon)
        .bind(row.t_acd)
        .bind(row.mt_acd)
        .bind(row.n_acd)
        .bind(row.t_acw)
        .bind(row.mt_acw)
        .bind(row.n_acw)
        .bind(row.t_agent_response_time)
        .bind(row.mt_agent_response_time)
        .bind(row.n_agent_response_time)
        .bind(row.t_answered)
        .bind(row.mt_answered)
        .bind(row.n_answered)
        .bind(row.t_handle)
        .bind(row.mt_handle)
        .bind(row.n_handle)
        .bind(row.t_held)
        .bind(row.mt_held)
        .bind(row.n_held)
        .bind(row.t_held_complete)
        .bind(row.mt_held_complete)
        .bind(row.n_held_complete)
        .bind(row.t_ivr)
        .bind(row.mt_ivr)
        .bind(row.n_ivr)
        .bind(row.t_talk)
        .bind(row.mt_talk)
        .bind(row.n_talk)
        .bind(row.t_talk_complete)
        .bind(row.mt_talk_complete)
        .bind(row.n_talk_complete)
        .bind(row.t_user_response_time)
        .bind(row.mt_user_response_time)
        .bind(row.n_user_response_time)
        .bind(&row.queue_id)
        .bind(&row.media_type)
        .bind(row.interval_start)
        .execute(&self.pool)
        .await
        .context("QueueStatsRepository::update")?;

        Ok(())
    }
}
