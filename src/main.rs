//! Returns & Delivery Core - service entry point

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use returns_core::config::Config;
use returns_core::events::EventPublisher;
use returns_core::http::{self, AppState};
use returns_core::services::delivery::DeliveryService;
use returns_core::services::orders::OrderService;
use returns_core::services::returns::ReturnService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let events = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => EventPublisher::new(Some(client)),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, events disabled");
                EventPublisher::disabled()
            }
        },
        None => EventPublisher::disabled(),
    };

    let state = AppState {
        returns: ReturnService::new(db.clone(), events, config.return_window_days),
        delivery: DeliveryService::new(db.clone()),
        orders: OrderService::new(db),
        admin_api_key: config.admin_api_key.clone(),
    };

    let app = http::router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("returns-core listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
