use axum::{
    Router,
    http::Method,
    middleware as axum_middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::campaigns::Broadcaster;
use crate::config::ServerConfig;
use crate::ingest::UpdateIngestor;
use crate::store::StoreProvider;
use crate::telegram::BotTransport;
use crate::web::{middleware::auth, routes::*};

pub use error::AppError;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<ServerConfig>,
    pub transport: Arc<dyn BotTransport>,
    pub ingestor: UpdateIngestor,
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(
        db_pool: DatabaseConnection,
        config: Arc<ServerConfig>,
        transport: Arc<dyn BotTransport>,
        stores: Arc<dyn StoreProvider>,
    ) -> Self {
        let ingestor = UpdateIngestor::new(stores.clone(), transport.clone());
        let broadcaster = Broadcaster::new(
            stores,
            transport.clone(),
            config.date_format.as_str(),
            config.broadcast_concurrency,
        );
        Self {
            db_pool,
            config,
            transport,
            ingestor,
            broadcaster,
        }
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .merge(webhook_routes::create_webhook_router())
        .merge(
            telegram_routes::create_telegram_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .merge(
            campaign_routes::create_campaign_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .merge(
            client_routes::create_client_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(cors)
}
