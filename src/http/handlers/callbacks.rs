use crate::gateways::{CallbackParams, Gateway};
use crate::AppState;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Path, Query, State};
use axum::response::Redirect;
use std::collections::HashMap;

type RawParams = HashMap<String, String>;

pub async fn gateway_redirect(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    query: Result<Query<RawParams>, QueryRejection>,
) -> Redirect {
    let params = query.map(|Query(q)| q).unwrap_or_default();
    settle(&state, &gateway, params.into()).await
}

/// Some wallets post the return form instead of redirecting.
pub async fn gateway_form_post(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    form: Result<Form<RawParams>, FormRejection>,
) -> Redirect {
    let params = form.map(|Form(f)| f).unwrap_or_default();
    settle(&state, &gateway, params.into()).await
}

async fn settle(state: &AppState, gateway: &str, params: CallbackParams) -> Redirect {
    let Some(gateway) = Gateway::from_label(gateway) else {
        tracing::warn!(gateway, "callback for unknown gateway");
        return Redirect::to(&state.reconciler.redirects().generic_failure());
    };

    let result = state.reconciler.handle_callback(gateway, &params).await;
    Redirect::to(result.redirect_target())
}
