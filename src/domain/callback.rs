use crate::gateways::Gateway;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCallback {
    pub gateway: Gateway,
    pub order_id: Option<String>,
    pub status: Option<String>,
    pub transaction_id: String,
    pub payer_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileOutcome {
    Paid,
    AlreadyPaid,
    GatewayDeclined,
    GatewayMismatch,
    OrderNotFound,
    MalformedCallback,
    Tampered,
    StoreUnavailable,
}

impl ReconcileOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Paid | Self::AlreadyPaid)
    }

    /// Outcomes tied to a resolved order get order-keyed redirects; the rest
    /// fall back to the generic failure page.
    pub fn has_order(self) -> bool {
        matches!(
            self,
            Self::Paid | Self::AlreadyPaid | Self::GatewayDeclined | Self::GatewayMismatch
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::AlreadyPaid => "already_paid",
            Self::GatewayDeclined => "gateway_declined",
            Self::GatewayMismatch => "gateway_mismatch",
            Self::OrderNotFound => "order_not_found",
            Self::MalformedCallback => "malformed_callback",
            Self::Tampered => "tampered",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub success: bool,
    pub redirect_success: String,
    pub redirect_failure: String,
    pub outcome: ReconcileOutcome,
}

impl ReconciliationResult {
    pub fn redirect_target(&self) -> &str {
        if self.success {
            &self.redirect_success
        } else {
            &self.redirect_failure
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedirectTargets {
    base_url: String,
}

impl RedirectTargets {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn success(&self, order_id: &str) -> String {
        format!("{}/order-confirmation/{}", self.base_url, order_id)
    }

    pub fn failure(&self, order_id: &str) -> String {
        format!("{}/order-cancelled/{}", self.base_url, order_id)
    }

    pub fn generic_failure(&self) -> String {
        format!("{}/order-cancelled", self.base_url)
    }

    pub fn resolve(&self, order_id: Option<&str>, outcome: ReconcileOutcome) -> ReconciliationResult {
        let (redirect_success, redirect_failure) = match order_id {
            Some(id) if outcome.has_order() => (self.success(id), self.failure(id)),
            _ => (self.generic_failure(), self.generic_failure()),
        };
        ReconciliationResult {
            success: outcome.is_success(),
            redirect_success,
            redirect_failure,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_keyed_urls() {
        let targets = RedirectTargets::new("https://shop.test/");
        let out = targets.resolve(Some("ORD1"), ReconcileOutcome::GatewayDeclined);
        assert!(!out.success);
        assert_eq!(out.redirect_success, "https://shop.test/order-confirmation/ORD1");
        assert_eq!(out.redirect_target(), "https://shop.test/order-cancelled/ORD1");
    }

    #[test]
    fn store_failures_use_generic_page() {
        let targets = RedirectTargets::new("https://shop.test");
        let out = targets.resolve(Some("ORD1"), ReconcileOutcome::StoreUnavailable);
        assert_eq!(out.redirect_target(), "https://shop.test/order-cancelled");
    }
}
