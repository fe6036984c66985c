use crate::domain::order::{MarkPaidFields, Order, OrderPaidEvent, PaymentResult};
use crate::repo::outbox_repo::OutboxRepo;
use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub const ORDER_PAID_EVENT: &str = "order.paid";

/// Order persistence as seen by the reconciler.
///
/// `conditional_mark_paid` is the only write path for payment fields. It must
/// apply atomically and only while the order is unpaid, returning `None` when
/// it did not apply (already paid, or the order is gone).
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, order_id: &str) -> Result<Option<Order>>;

    async fn conditional_mark_paid(
        &self,
        order_id: &str,
        fields: MarkPaidFields,
    ) -> Result<Option<Order>>;
}

#[derive(Clone)]
pub struct PgOrdersRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl OrderStore for PgOrdersRepo {
    async fn find_by_id(&self, order_id: &str) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, payment_method, is_paid, paid_at, payment_result_id,
                   payment_result_status, payment_result_email, order_status
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(order_from_row))
    }

    async fn conditional_mark_paid(
        &self,
        order_id: &str,
        fields: MarkPaidFields,
    ) -> Result<Option<Order>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET is_paid = true,
                paid_at = $2,
                payment_result_id = $3,
                payment_result_status = $4,
                payment_result_email = $5,
                updated_at = now()
            WHERE id = $1 AND is_paid = false
            RETURNING id, payment_method, is_paid, paid_at, payment_result_id,
                      payment_result_status, payment_result_email, order_status
            "#,
        )
        .bind(order_id)
        .bind(fields.paid_at)
        .bind(&fields.payment_result.id)
        .bind(&fields.payment_result.status)
        .bind(fields.payment_result.email.as_deref())
        .fetch_optional(tx.as_mut())
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let order = order_from_row(&row);
        let event = OrderPaidEvent::from_order(&order, &fields);
        OutboxRepo::insert_tx(&mut tx, &order.id, ORDER_PAID_EVENT, serde_json::to_value(event)?)
            .await?;
        tx.commit().await?;

        Ok(Some(order))
    }
}

fn order_from_row(row: &PgRow) -> Order {
    let result_id: Option<String> = row.get("payment_result_id");
    let result_status: Option<String> = row.get("payment_result_status");
    let payment_result = result_id.map(|id| PaymentResult {
        id,
        status: result_status.unwrap_or_default(),
        email: row.get("payment_result_email"),
    });

    Order {
        id: row.get("id"),
        payment_method: row.get("payment_method"),
        is_paid: row.get("is_paid"),
        paid_at: row.get("paid_at"),
        payment_result,
        order_status: row.get("order_status"),
    }
}
