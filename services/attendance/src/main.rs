use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use campus_attendance::config::AttendanceConfig;
use campus_attendance::infra::delivery::ConfiguredDelivery;
use campus_attendance::locks::PairLocks;
use campus_attendance::router::build_router;
use campus_attendance::state::AppState;
use campus_core::config::Config;
use campus_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AttendanceConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let delivery = ConfiguredDelivery::from_webhook_url(config.delivery_webhook_url.as_deref());
    match &delivery {
        ConfiguredDelivery::Webhook(webhook) => {
            info!(url = webhook.url(), "delivering verification codes via webhook");
        }
        ConfiguredDelivery::Log(_) => {
            info!("DELIVERY_WEBHOOK_URL not set; verification codes will only be logged");
        }
    }

    let state = AppState {
        db: Arc::new(db),
        delivery,
        locks: PairLocks::new(),
        delivery_timeout: config.delivery_timeout(),
        store_timeout: config.store_timeout(),
        late_grace: config.late_grace,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.attendance_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("attendance service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
