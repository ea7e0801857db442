use std::time::Duration;

use papertrade::api::routes::{AppState, app_router};
use papertrade::config::Config;
use papertrade::{persistence, simulator};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("papertrade=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let pool = persistence::create_pool_and_migrate(&config.database_url)
        .await
        .expect("database connection and migrations");

    let seeded = simulator::seed_if_empty(&pool)
        .await
        .expect("instrument seeding");
    if seeded > 0 {
        info!(count = seeded, "seeded instrument catalog");
    }

    tokio::spawn(simulator::run(
        pool.clone(),
        Duration::from_secs(config.sim_tick_secs),
    ));

    let state = AppState {
        pool,
        session_ttl_hours: config.session_ttl_hours,
        starting_balance: config.starting_balance,
    };
    let app = app_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind listener");
    info!(%addr, "listening");
    axum::serve(listener, app).await.expect("server error");
}
