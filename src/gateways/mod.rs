use crate::domain::callback::NormalizedCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod easypaisa;
pub mod jazzcash;
pub mod params;
pub mod stripe;
pub mod verifier;

pub use params::CallbackParams;
pub use verifier::CallbackVerifier;

pub const ORDER_ID: &str = "orderId";
pub const STATUS: &str = "status";
pub const TRANSACTION_ID: &str = "transactionId";
pub const EMAIL: &str = "email";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Stripe,
    JazzCash,
    Easypaisa,
}

/// Candidate parameter names per normalized field, highest priority first.
pub struct ExtractionTable {
    pub order_id: &'static [&'static str],
    pub status: &'static [&'static str],
    pub transaction_id: &'static [&'static str],
}

impl Gateway {
    pub const ALL: [Gateway; 3] = [Gateway::Stripe, Gateway::JazzCash, Gateway::Easypaisa];

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Gateway::Stripe => "stripe",
            Gateway::JazzCash => "jazzcash",
            Gateway::Easypaisa => "easypaisa",
        }
    }

    pub fn table(self) -> &'static ExtractionTable {
        match self {
            Gateway::Stripe => &stripe::TABLE,
            Gateway::JazzCash => &jazzcash::TABLE,
            Gateway::Easypaisa => &easypaisa::TABLE,
        }
    }

    pub fn success_tokens(self) -> &'static [&'static str] {
        match self {
            Gateway::Stripe => stripe::SUCCESS_TOKENS,
            Gateway::JazzCash => jazzcash::SUCCESS_TOKENS,
            Gateway::Easypaisa => easypaisa::SUCCESS_TOKENS,
        }
    }

    pub fn extract(self, params: &CallbackParams) -> NormalizedCallback {
        let table = self.table();
        let order_id = params.first_of(table.order_id).map(str::to_string);
        let transaction_id = params
            .first_of(table.transaction_id)
            .map(str::to_string)
            .or_else(|| order_id.clone())
            .unwrap_or_default();

        NormalizedCallback {
            gateway: self,
            order_id,
            status: params.first_of(table.status).map(str::to_string),
            transaction_id,
            payer_email: params.get(EMAIL).map(str::to_string),
        }
    }

    /// Anything not on the gateway's whitelist is a failure, including a
    /// missing token.
    pub fn reports_success(self, raw_status: Option<&str>) -> bool {
        let Some(token) = raw_status.map(str::trim).filter(|t| !t.is_empty()) else {
            return false;
        };
        self.success_tokens().iter().any(|expected| {
            if expected.bytes().all(|b| b.is_ascii_digit()) {
                *expected == token
            } else {
                expected.eq_ignore_ascii_case(token)
            }
        })
    }

    /// Whether an order set up to settle via `payment_method` may be settled
    /// by a callback from this gateway.
    pub fn settles(self, payment_method: &str) -> bool {
        self.label().eq_ignore_ascii_case(payment_method.trim())
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for gateway in Gateway::ALL {
            assert_eq!(Gateway::from_label(gateway.label()), Some(gateway));
        }
        assert_eq!(Gateway::from_label("JazzCash"), Some(Gateway::JazzCash));
        assert_eq!(Gateway::from_label("paypal"), None);
    }

    #[test]
    fn whitelists_are_fail_closed() {
        assert!(Gateway::Stripe.reports_success(Some("succeeded")));
        assert!(Gateway::Stripe.reports_success(Some("Succeeded")));
        assert!(!Gateway::Stripe.reports_success(Some("requires_payment_method")));
        assert!(Gateway::JazzCash.reports_success(Some("000")));
        assert!(!Gateway::JazzCash.reports_success(Some("0000")));
        assert!(!Gateway::JazzCash.reports_success(Some("124")));
        assert!(Gateway::Easypaisa.reports_success(Some("0000")));
        assert!(Gateway::Easypaisa.reports_success(Some("00")));
        assert!(!Gateway::Easypaisa.reports_success(Some("000")));

        for gateway in Gateway::ALL {
            assert!(!gateway.reports_success(None));
            assert!(!gateway.reports_success(Some("")));
            assert!(!gateway.reports_success(Some("failed")));
        }
    }

    #[test]
    fn payment_method_must_name_the_gateway() {
        assert!(Gateway::JazzCash.settles("jazzcash"));
        assert!(Gateway::JazzCash.settles("JazzCash"));
        assert!(!Gateway::JazzCash.settles("stripe"));
    }
}
