//! Server binary: resolves settings, opens the pool, mounts the routes, and
//! serves until shutdown.

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use world_api::{common_routes, connect_pool, world_routes, AppState, Settings, WorldService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("world_api=info".parse()?))
        .init();

    let settings = Settings::from_env();
    let pool = connect_pool(&settings).await?;
    let service = WorldService::new(pool.clone(), settings.clone());
    let state = AppState { pool, service };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(world_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
