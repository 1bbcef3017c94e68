use axum::{Extension, Json, Router, extract::State, routing::get};
use std::sync::Arc;

use crate::db::services;
use crate::web::models::{AuthenticatedUser, ClientsResponse};
use crate::web::{AppError, AppState};

/// Any member of the tenant may read its leads and subscribers.
async fn list_clients_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ClientsResponse>, AppError> {
    let clients = services::list_clients(&app_state.db_pool, user.tenant_id).await?;
    let telegram_users =
        services::list_subscribed_users(&app_state.db_pool, user.tenant_id).await?;

    Ok(Json(ClientsResponse {
        clients: clients.into_iter().map(Into::into).collect(),
        telegram_users: telegram_users.into_iter().map(Into::into).collect(),
    }))
}

pub fn create_client_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/clients", get(list_clients_handler))
}
