use crate::gateways::{ExtractionTable, ORDER_ID, STATUS, TRANSACTION_ID};

pub const SUCCESS_TOKENS: &[&str] = &["0000", "00", "success"];

pub static TABLE: ExtractionTable = ExtractionTable {
    order_id: &[ORDER_ID, "reference_id", "order_id"],
    status: &[STATUS],
    transaction_id: &[TRANSACTION_ID, "transaction_id"],
};
