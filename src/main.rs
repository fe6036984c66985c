use payment_callbacks::config::AppConfig;
use payment_callbacks::domain::callback::RedirectTargets;
use payment_callbacks::gateways::CallbackVerifier;
use payment_callbacks::repo::orders_repo::PgOrdersRepo;
use payment_callbacks::repo::outbox_repo::OutboxRepo;
use payment_callbacks::service::outbox_relay::OutboxRelay;
use payment_callbacks::service::reconciler::CallbackReconciler;
use payment_callbacks::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_millis(cfg.order_store_timeout_ms))
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(cfg.redis_url.clone())?;

    if cfg.jazzcash_integrity_salt.is_none() {
        tracing::warn!("JAZZCASH_INTEGRITY_SALT not set, jazzcash callbacks are not signature-checked");
    }

    let reconciler = CallbackReconciler::new(
        Arc::new(PgOrdersRepo { pool: pool.clone() }),
        RedirectTargets::new(&cfg.storefront_base_url),
        Duration::from_millis(cfg.order_store_timeout_ms),
    )
    .with_verifier(CallbackVerifier {
        jazzcash_integrity_salt: cfg.jazzcash_integrity_salt.clone(),
    });

    let relay = OutboxRelay {
        outbox_repo: OutboxRepo { pool: pool.clone() },
        redis_client: redis_client.clone(),
        stream_key: cfg.stream_key.clone(),
    };
    tokio::spawn(relay.run());

    let state = AppState {
        reconciler,
        pool,
        redis_client,
    };
    let app = payment_callbacks::http::routes::build(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
