use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use crate::campaigns::should_broadcast;
use crate::db::entities::campaign;
use crate::db::services::{self, NewCampaign};
use crate::web::middleware::auth::require_admin;
use crate::web::models::{
    AuthenticatedUser, CreateCampaignResponse, UpdateCampaignStatusRequest,
};
use crate::web::{AppError, AppState};

async fn list_campaigns_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<campaign::Model>>, AppError> {
    let campaigns = services::list_campaigns(&app_state.db_pool, user.tenant_id).await?;
    Ok(Json(campaigns))
}

fn validate_new_campaign(mut payload: NewCampaign) -> Result<NewCampaign, AppError> {
    payload.name = payload.name.trim().to_string();
    if payload.name.is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()));
    }
    if let (Some(start), Some(end)) = (payload.starts_at, payload.ends_at) {
        if end < start {
            return Err(AppError::InvalidInput(
                "ends_at must not be before starts_at".to_string(),
            ));
        }
    }
    Ok(payload)
}

async fn create_campaign_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NewCampaign>,
) -> Result<(StatusCode, Json<CreateCampaignResponse>), AppError> {
    require_admin(&user)?;
    let payload = validate_new_campaign(payload)?;
    let status = payload.status;

    let id = services::create_campaign(&app_state.db_pool, user.tenant_id, payload).await?;
    info!(tenant_id = %user.tenant_id, campaign_id = %id, %status, "Campaign created.");

    if should_broadcast(None, status) {
        app_state.broadcaster.spawn_broadcast(user.tenant_id, id);
    }
    Ok((StatusCode::CREATED, Json(CreateCampaignResponse { ok: true, id })))
}

async fn update_campaign_status_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateCampaignStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let existing = services::find_campaign(&app_state.db_pool, user.tenant_id, payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    let rows = services::update_campaign_status(
        &app_state.db_pool,
        user.tenant_id,
        payload.id,
        payload.status,
    )
    .await?;
    info!(
        tenant_id = %user.tenant_id,
        campaign_id = %payload.id,
        from = %existing.status,
        to = %payload.status,
        rows,
        "Campaign status updated."
    );

    // Zero rows means a concurrent request already published it.
    if rows == 1 && should_broadcast(Some(existing.status), payload.status) {
        app_state
            .broadcaster
            .spawn_broadcast(user.tenant_id, payload.id);
    }
    Ok(Json(json!({ "ok": true })))
}

pub fn create_campaign_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/campaigns",
        get(list_campaigns_handler)
            .post(create_campaign_handler)
            .patch(update_campaign_status_handler),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::CampaignStatus;

    fn payload(value: Value) -> NewCampaign {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn new_campaign_defaults_to_draft_and_trims_name() {
        let validated = validate_new_campaign(payload(json!({ "name": "  Soldes " }))).unwrap();
        assert_eq!(validated.name, "Soldes");
        assert_eq!(validated.status, CampaignStatus::Draft);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = validate_new_campaign(payload(json!({ "name": "   " }))).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn inverted_period_is_rejected() {
        let err = validate_new_campaign(payload(json!({
            "name": "Soldes",
            "starts_at": "2024-02-01",
            "ends_at": "2024-01-01"
        })))
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
