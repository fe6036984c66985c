use crate::domain::callback::{
    NormalizedCallback, ReconcileOutcome, ReconciliationResult, RedirectTargets,
};
use crate::domain::order::{parse_order_id, MarkPaidFields, Order, PaymentResult};
use crate::gateways::{CallbackParams, CallbackVerifier, Gateway};
use crate::repo::orders_repo::OrderStore;
use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The only component allowed to move an order to paid in response to a
/// gateway callback.
///
/// Every call ends in a [`ReconciliationResult`]; store errors are folded into
/// [`ReconcileOutcome::StoreUnavailable`] rather than returned.
#[derive(Clone)]
pub struct CallbackReconciler {
    store: Arc<dyn OrderStore>,
    redirects: RedirectTargets,
    verifier: CallbackVerifier,
    store_timeout: Duration,
}

impl CallbackReconciler {
    pub fn new(store: Arc<dyn OrderStore>, redirects: RedirectTargets, store_timeout: Duration) -> Self {
        Self {
            store,
            redirects,
            verifier: CallbackVerifier::default(),
            store_timeout,
        }
    }

    pub fn with_verifier(mut self, verifier: CallbackVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn redirects(&self) -> &RedirectTargets {
        &self.redirects
    }

    /// Verify, extract and reconcile one inbound callback.
    pub async fn handle_callback(&self, gateway: Gateway, params: &CallbackParams) -> ReconciliationResult {
        let callback = gateway.extract(params);
        if !self.verifier.verify(gateway, params) {
            tracing::warn!(
                gateway = %gateway,
                order_id = callback.order_id.as_deref().unwrap_or("-"),
                outcome = ReconcileOutcome::Tampered.as_str(),
                "callback signature rejected"
            );
            return self.redirects.resolve(None, ReconcileOutcome::Tampered);
        }
        self.reconcile_callback(&callback).await
    }

    pub async fn reconcile_callback(&self, callback: &NormalizedCallback) -> ReconciliationResult {
        self.run(
            callback.order_id.as_deref(),
            callback.status.as_deref(),
            &callback.transaction_id,
            callback.gateway,
            callback.payer_email.as_deref(),
        )
        .await
    }

    pub async fn reconcile(
        &self,
        order_id: Option<&str>,
        raw_status: Option<&str>,
        transaction_id: &str,
        gateway: Gateway,
    ) -> ReconciliationResult {
        self.run(order_id, raw_status, transaction_id, gateway, None).await
    }

    async fn run(
        &self,
        order_id: Option<&str>,
        raw_status: Option<&str>,
        transaction_id: &str,
        gateway: Gateway,
        email: Option<&str>,
    ) -> ReconciliationResult {
        let Some(order_id) = order_id.and_then(parse_order_id) else {
            log_outcome(gateway, order_id.unwrap_or("-"), ReconcileOutcome::MalformedCallback);
            return self.redirects.resolve(None, ReconcileOutcome::MalformedCallback);
        };

        let outcome = self
            .settle(order_id, raw_status, transaction_id, gateway, email)
            .await;
        log_outcome(gateway, order_id, outcome);
        self.redirects.resolve(Some(order_id), outcome)
    }

    /// The paid guard runs before status classification: a paid order answers
    /// `AlreadyPaid` whatever token the callback carries.
    async fn settle(
        &self,
        order_id: &str,
        raw_status: Option<&str>,
        transaction_id: &str,
        gateway: Gateway,
        email: Option<&str>,
    ) -> ReconcileOutcome {
        let order = match self.bounded(self.store.find_by_id(order_id)).await {
            Ok(Some(order)) => order,
            Ok(None) => return ReconcileOutcome::OrderNotFound,
            Err(e) => return store_failure(gateway, order_id, "lookup", e),
        };

        if !gateway.settles(&order.payment_method) {
            tracing::warn!(
                gateway = %gateway,
                order_id,
                payment_method = %order.payment_method,
                outcome = ReconcileOutcome::GatewayMismatch.as_str(),
                "callback gateway does not match order payment method"
            );
            return ReconcileOutcome::GatewayMismatch;
        }

        if order.is_paid {
            return ReconcileOutcome::AlreadyPaid;
        }

        if !gateway.reports_success(raw_status) {
            tracing::info!(
                gateway = %gateway,
                order_id,
                status = raw_status.unwrap_or("-"),
                outcome = ReconcileOutcome::GatewayDeclined.as_str(),
                "gateway reported failure"
            );
            return ReconcileOutcome::GatewayDeclined;
        }

        let fields = MarkPaidFields {
            paid_at: chrono::Utc::now(),
            payment_result: PaymentResult {
                id: transaction_id.to_string(),
                status: raw_status.unwrap_or_default().to_string(),
                email: email.map(str::to_string),
            },
        };

        match self.bounded(self.store.conditional_mark_paid(&order.id, fields)).await {
            Ok(Some(_)) => ReconcileOutcome::Paid,
            Ok(None) => self.after_lost_write(&order, gateway).await,
            Err(e) => store_failure(gateway, order_id, "conditional_mark_paid", e),
        }
    }

    /// The conditional write did not apply: either a concurrent callback won
    /// or the order disappeared in between.
    async fn after_lost_write(&self, order: &Order, gateway: Gateway) -> ReconcileOutcome {
        match self.bounded(self.store.find_by_id(&order.id)).await {
            Ok(Some(current)) if current.is_paid => ReconcileOutcome::AlreadyPaid,
            Ok(_) => ReconcileOutcome::OrderNotFound,
            Err(e) => store_failure(gateway, &order.id, "recheck", e),
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(res) => res,
            Err(_) => Err(anyhow!(
                "order store did not answer within {}ms",
                self.store_timeout.as_millis()
            )),
        }
    }
}

fn store_failure(gateway: Gateway, order_id: &str, op: &str, err: anyhow::Error) -> ReconcileOutcome {
    tracing::error!(
        gateway = %gateway,
        order_id,
        op,
        outcome = ReconcileOutcome::StoreUnavailable.as_str(),
        "order store failure: {:#}",
        err
    );
    ReconcileOutcome::StoreUnavailable
}

fn log_outcome(gateway: Gateway, order_id: &str, outcome: ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Paid => {
            tracing::info!(gateway = %gateway, order_id, outcome = outcome.as_str(), "order marked paid")
        }
        ReconcileOutcome::AlreadyPaid => {
            tracing::info!(gateway = %gateway, order_id, outcome = outcome.as_str(), "replayed callback ignored")
        }
        // logged where they are detected
        ReconcileOutcome::StoreUnavailable
        | ReconcileOutcome::GatewayDeclined
        | ReconcileOutcome::GatewayMismatch => {}
        _ => {
            tracing::warn!(gateway = %gateway, order_id, outcome = outcome.as_str(), "callback not settled")
        }
    }
}
