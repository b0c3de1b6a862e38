use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_admin_server::assets::CloudinaryGateway;
use storefront_admin_server::routes::{
    create_assets, create_product, delete_asset, health_check, ingest_order, list_assets,
    list_products, purge_assets, register_store, store_revenue,
};
use storefront_admin_server::{open_database, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_admin_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Storefront Admin Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Open database
    let db = open_database(&config.database_path)?;

    // Remote image host gateway
    let gateway = Arc::new(CloudinaryGateway::new(
        config.cloudinary_cloud_name.clone(),
        config.cloudinary_api_key.clone(),
        config.cloudinary_api_secret.clone(),
    ));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .map(|s| s.parse().unwrap())
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    // Create app state
    let state = AppState::new(db, config.clone(), gateway);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/stores", post(register_store))
        .route("/api/:store_id/revenue", get(store_revenue))
        .route(
            "/api/:store_id/products",
            post(create_product).get(list_products),
        )
        .route("/api/:store_id/orders", post(ingest_order))
        .route(
            "/api/:store_id/assets",
            post(create_assets)
                .get(list_assets)
                .delete(purge_assets),
        )
        .route("/api/:store_id/assets/:asset_id", delete(delete_asset))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
