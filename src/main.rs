mod config;
mod db;
mod error;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    if config.auth.is_none() {
        tracing::warn!("AUTH_URL/AUTH_API_KEY not set; signed-in routes will answer 503");
    }

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");
    let state = state::AppState::new(pool, config.auth, config.assets_dir);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "community hub listening");
    axum::serve(listener, app).await.expect("server failed");
}
