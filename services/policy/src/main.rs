use std::net::SocketAddr;

use sea_orm::Database;
use tracing::info;

use attest_policy::config::PolicyConfig;
use attest_policy::router::build_router;
use attest_policy::state::AppState;

#[tokio::main]
async fn main() {
    attest_core::tracing::init_tracing();

    let config = PolicyConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        http: reqwest::Client::new(),
        jwt_secret: config.jwt_secret,
        frontend_url: config.frontend_url,
        email_api_url: config.email_api_url,
        email_api_key: config.email_api_key,
        storage_base_url: config.storage_base_url,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.policy_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("policy service listening on {addr}");
    // ConnectInfo feeds the peer-address fallback for client IP capture
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
