use crate::gateways::{ExtractionTable, ORDER_ID, STATUS, TRANSACTION_ID};

pub const SUCCESS_TOKENS: &[&str] = &["succeeded", "success"];

pub static TABLE: ExtractionTable = ExtractionTable {
    order_id: &[ORDER_ID],
    status: &[STATUS],
    transaction_id: &[TRANSACTION_ID],
};

#[cfg(test)]
mod tests {
    use crate::gateways::{CallbackParams, Gateway};

    #[test]
    fn transaction_falls_back_to_order_id() {
        let params: CallbackParams = vec![
            ("orderId", Some("ORD9".to_string())),
            ("status", Some("succeeded".to_string())),
            ("session_id", Some("cs_test_1".to_string())),
        ]
        .into_iter()
        .collect();

        let cb = Gateway::Stripe.extract(&params);
        assert_eq!(cb.order_id.as_deref(), Some("ORD9"));
        assert_eq!(cb.transaction_id, "ORD9");
    }
}
