use crate::http::handlers::{callbacks, ops};
use crate::AppState;
use axum::routing::get;
use axum::Router;

pub fn build(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/payments/:gateway/callback",
            get(callbacks::gateway_redirect).post(callbacks::gateway_form_post),
        )
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .with_state(state)
}
