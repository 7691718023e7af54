mod config;
mod content;
mod data;
mod db;
mod error;
mod handlers;
mod models;
mod routes;
mod sitemap;
mod state;
mod utils;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{config::Config, state::AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("❌ Falha ao iniciar o servidor: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let pool = db::init_db(&config.database_url).await?;
    tracing::info!("✅ Conexão a Postgres estabelecida");

    db::run_migrations(&pool).await?;
    tracing::info!("Migrações aplicadas");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let site_url = config.site_url.clone();

    let app = routes::create_routes(AppState::new(pool, config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("🚀 Diretório de Pilates rodando em http://{} ({})", addr, site_url);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
