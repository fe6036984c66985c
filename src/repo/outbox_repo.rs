use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Row, Transaction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: i64,
    pub order_id: String,
    pub event_type: String,
    pub payload_json: serde_json::Value,
    pub attempts: i32,
}

/// A claimed row stuck in `PROCESSING` longer than this is due again.
pub const PROCESSING_LEASE_SECS: i64 = 60;

/// Per-row bookkeeping after a publish attempt.
#[async_trait::async_trait]
pub trait OutboxLedger: Send + Sync {
    async fn mark_published(&self, id: i64) -> Result<()>;
    async fn reschedule(&self, id: i64, attempts: i32, next_attempt_at: DateTime<Utc>) -> Result<()>;
}

/// Pending downstream events for order state changes. Rows are written in the
/// same transaction as the change and are unique per `(order_id, event_type)`.
#[derive(Clone)]
pub struct OutboxRepo {
    pub pool: PgPool,
}

impl OutboxRepo {
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: &str,
        event_type: &str,
        payload_json: serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_events_outbox (order_id, event_type, payload_json)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, event_type) DO NOTHING
            "#,
        )
        .bind(order_id)
        .bind(event_type)
        .bind(payload_json)
        .execute(tx.as_mut())
        .await?;

        Ok(())
    }

    /// Moves up to `batch_size` due rows to `PROCESSING` and returns them.
    /// Rows claimed by another relay instance are skipped. A `PROCESSING` row
    /// whose lease has lapsed counts as due, so a relay that died or failed
    /// mid-batch does not strand it.
    pub async fn claim_due(&self, batch_size: i64) -> Result<Vec<OutboxEvent>> {
        let rows = sqlx::query(
            r#"
            UPDATE order_events_outbox
            SET status = 'PROCESSING', updated_at = now()
            WHERE id IN (
                SELECT id FROM order_events_outbox
                WHERE (status = 'PENDING' AND next_attempt_at <= now())
                   OR (status = 'PROCESSING' AND updated_at < now() - make_interval(secs => $2))
                ORDER BY id
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, order_id, event_type, payload_json, attempts
            "#,
        )
        .bind(batch_size)
        .bind(PROCESSING_LEASE_SECS as f64)
        .fetch_all(&self.pool)
        .await?;

        let mut events: Vec<OutboxEvent> = rows
            .into_iter()
            .map(|r| OutboxEvent {
                id: r.get("id"),
                order_id: r.get("order_id"),
                event_type: r.get("event_type"),
                payload_json: r.get("payload_json"),
                attempts: r.get("attempts"),
            })
            .collect();
        events.sort_by_key(|e| e.id);
        Ok(events)
    }
}

#[async_trait::async_trait]
impl OutboxLedger for OutboxRepo {
    async fn mark_published(&self, id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE order_events_outbox SET status = 'PUBLISHED', published_at = now(), updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reschedule(&self, id: i64, attempts: i32, next_attempt_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE order_events_outbox SET status = 'PENDING', attempts = $2, next_attempt_at = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(attempts)
        .bind(next_attempt_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
