use axum::{
    Extension, Json, Router,
    extract::State,
    routing::get,
};
use std::sync::Arc;
use tracing::info;

use crate::bot_config::{self, BotIdentity};
use crate::db::services;
use crate::telegram::BotToken;
use crate::web::middleware::auth::require_admin;
use crate::web::models::{
    AuthenticatedUser, TelegramSettingsResponse, UpdateTelegramSettingsRequest,
    UpdateTelegramSettingsResponse,
};
use crate::web::{AppError, AppState};

async fn get_telegram_settings_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<TelegramSettingsResponse>, AppError> {
    let settings = services::get_bot_settings(&app_state.db_pool, user.tenant_id).await?;
    let (bot_token, start_message, stop_message) = match settings {
        Some(s) => (
            s.bot_token.filter(|t| !t.trim().is_empty()),
            s.start_message,
            s.stop_message,
        ),
        None => (None, None, None),
    };

    let identity = match bot_token.as_deref() {
        Some(token) => {
            bot_config::describe_bot(app_state.transport.as_ref(), &BotToken::new(token)).await
        }
        None => BotIdentity::default(),
    };
    let webhook_url = app_state
        .config
        .site_url
        .as_deref()
        .map(|site| bot_config::webhook_url(site, user.tenant_id));

    Ok(Json(TelegramSettingsResponse {
        configured: bot_token.is_some(),
        bot_token: bot_token.filter(|_| user.role.is_admin()),
        start_message,
        stop_message,
        webhook_url,
        identity,
    }))
}

async fn update_telegram_settings_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateTelegramSettingsRequest>,
) -> Result<Json<UpdateTelegramSettingsResponse>, AppError> {
    require_admin(&user)?;
    let bot_token = payload.bot_token.trim();
    if bot_token.is_empty() {
        return Err(AppError::InvalidInput("bot_token is required".to_string()));
    }

    services::upsert_bot_settings(
        &app_state.db_pool,
        user.tenant_id,
        bot_token,
        payload.start_message,
        payload.stop_message,
    )
    .await?;
    info!(tenant_id = %user.tenant_id, "Bot settings saved.");

    let webhook = match app_state.config.site_url.as_deref() {
        Some(site_url) => {
            bot_config::register_webhook(
                app_state.transport.as_ref(),
                &BotToken::new(bot_token),
                site_url,
                user.tenant_id,
            )
            .await
        }
        None => false,
    };

    Ok(Json(UpdateTelegramSettingsResponse { ok: true, webhook }))
}

pub fn create_telegram_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/telegram",
        get(get_telegram_settings_handler).put(update_telegram_settings_handler),
    )
}
