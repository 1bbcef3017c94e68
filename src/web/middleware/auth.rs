use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::db::services;
use crate::web::models::{AuthenticatedUser, Claims};
use crate::web::{AppState, error::AppError};

/// Resolves the bearer token (header first, then the `token` cookie) to a
/// user, then to that user's tenant and role.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let jwt_secret = &state.config.jwt_secret;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| jar.get("token").map(|c| c.value().to_string()))
        .ok_or(AppError::InvalidCredentials)?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!(error = ?e, "JWT decoding error during auth middleware.");
        AppError::InvalidCredentials
    })?;

    let user_id =
        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AppError::InvalidCredentials)?;
    let profile = services::get_profile(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("No tenant profile for this user".to_string()))?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        tenant_id: profile.tenant_id,
        role: profile.role,
    });
    Ok(next.run(req).await)
}

pub fn require_admin(user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only tenant admins can change this".to_string(),
        ))
    }
}
