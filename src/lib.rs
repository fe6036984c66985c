pub mod config;
pub mod domain {
    pub mod callback;
    pub mod order;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod callbacks;
        pub mod ops;
    }
    pub mod routes;
}
pub mod repo {
    pub mod memory_orders_repo;
    pub mod orders_repo;
    pub mod outbox_repo;
}
pub mod service {
    pub mod outbox_relay;
    pub mod reconciler;
}

#[derive(Clone)]
pub struct AppState {
    pub reconciler: service::reconciler::CallbackReconciler,
    pub pool: sqlx::PgPool,
    pub redis_client: redis::Client,
}
