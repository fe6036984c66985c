use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MAX_ORDER_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub email: Option<String>,
}

/// The slice of an order that payment reconciliation reads and writes.
///
/// `order_status` is the shipment lifecycle and is carried along untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub payment_method: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub order_status: String,
}

impl Order {
    pub fn unpaid(id: &str, payment_method: &str) -> Self {
        Self {
            id: id.to_string(),
            payment_method: payment_method.to_string(),
            is_paid: false,
            paid_at: None,
            payment_result: None,
            order_status: "PROCESSING".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkPaidFields {
    pub paid_at: DateTime<Utc>,
    pub payment_result: PaymentResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub event_id: Uuid,
    pub order_id: String,
    pub payment_method: String,
    pub transaction_id: String,
    pub gateway_status: String,
    pub paid_at: DateTime<Utc>,
}

impl OrderPaidEvent {
    pub fn from_order(order: &Order, fields: &MarkPaidFields) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            order_id: order.id.clone(),
            payment_method: order.payment_method.clone(),
            transaction_id: fields.payment_result.id.clone(),
            gateway_status: fields.payment_result.status.clone(),
            paid_at: fields.paid_at,
        }
    }
}

/// Returns the trimmed id if it is usable as an order key, `None` if it is
/// malformed. Malformed ids never reach the order store.
pub fn parse_order_id(raw: &str) -> Option<&str> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_ORDER_ID_LEN {
        return None;
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    Some(id)
}
