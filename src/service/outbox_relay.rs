use crate::repo::outbox_repo::{OutboxEvent, OutboxLedger, OutboxRepo};
use anyhow::Result;
use chrono::{Duration, Utc};

const BATCH_SIZE: i64 = 100;
const MAX_BACKOFF_SECS: i64 = 300;

#[async_trait::async_trait]
pub trait EventSink: Send {
    async fn publish(&mut self, event: &OutboxEvent) -> Result<()>;
}

pub struct RedisStreamSink {
    conn: redis::aio::MultiplexedConnection,
    stream_key: String,
}

#[async_trait::async_trait]
impl EventSink for RedisStreamSink {
    async fn publish(&mut self, event: &OutboxEvent) -> Result<()> {
        let payload = serde_json::to_string(&event.payload_json)?;
        let _: String = redis::cmd("XADD")
            .arg(&self.stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(1_000_000)
            .arg("*")
            .arg("type")
            .arg(&event.event_type)
            .arg("order_id")
            .arg(&event.order_id)
            .arg("event")
            .arg(payload)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }
}

/// Publishes claimed outbox rows to a Redis stream.
#[derive(Clone)]
pub struct OutboxRelay {
    pub outbox_repo: OutboxRepo,
    pub redis_client: redis::Client,
    pub stream_key: String,
}

impl OutboxRelay {
    pub async fn run(self) {
        tracing::info!(stream = %self.stream_key, "outbox relay started");
        loop {
            if let Err(err) = self.tick().await {
                tracing::error!("outbox relay error: {:#}", err);
            }
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        }
    }

    async fn tick(&self) -> Result<()> {
        let batch = self.outbox_repo.claim_due(BATCH_SIZE).await?;
        if batch.is_empty() {
            return Ok(());
        }

        // Rows left PROCESSING by an error here are reclaimed once their lease lapses.
        let mut sink = RedisStreamSink {
            conn: self.redis_client.get_multiplexed_async_connection().await?,
            stream_key: self.stream_key.clone(),
        };
        drain(&self.outbox_repo, &mut sink, batch).await;
        Ok(())
    }
}

/// Publishes every event of a claimed batch and records the result per row.
/// A failed publish or bookkeeping write never stops the rest of the batch.
/// Returns how many events reached the sink.
pub async fn drain(
    ledger: &dyn OutboxLedger,
    sink: &mut dyn EventSink,
    batch: Vec<OutboxEvent>,
) -> usize {
    let mut published = 0;
    for event in batch {
        match sink.publish(&event).await {
            Ok(()) => {
                published += 1;
                if let Err(e) = ledger.mark_published(event.id).await {
                    tracing::error!(
                        outbox_id = event.id,
                        order_id = %event.order_id,
                        "published event not recorded, it will be re-sent after the lease: {:#}",
                        e
                    );
                }
            }
            Err(e) => {
                let attempts = event.attempts + 1;
                let next_attempt_at = Utc::now() + Duration::seconds(backoff_secs(attempts));
                tracing::warn!(
                    outbox_id = event.id,
                    order_id = %event.order_id,
                    attempts,
                    "stream publish failed: {:#}",
                    e
                );
                if let Err(e) = ledger.reschedule(event.id, attempts, next_attempt_at).await {
                    tracing::error!(
                        outbox_id = event.id,
                        order_id = %event.order_id,
                        "outbox reschedule failed: {:#}",
                        e
                    );
                }
            }
        }
    }
    published
}

pub fn backoff_secs(attempts: i32) -> i64 {
    let exp = attempts.clamp(0, 16) as u32;
    i64::min(MAX_BACKOFF_SECS, 2_i64.pow(exp))
}
