use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bot_config::BotIdentity;
use crate::db::entities::{client, telegram_user};
use crate::db::enums::{CampaignStatus, UserRole};

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Identity-provider user id
    pub exp: usize,
}

/// Caller identity resolved by the auth middleware, passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct TelegramSettingsResponse {
    pub configured: bool,
    /// Only returned to admins.
    pub bot_token: Option<String>,
    pub start_message: Option<String>,
    pub stop_message: Option<String>,
    pub webhook_url: Option<String>,
    #[serde(flatten)]
    pub identity: BotIdentity,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTelegramSettingsRequest {
    pub bot_token: String,
    pub start_message: Option<String>,
    pub stop_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateTelegramSettingsResponse {
    pub ok: bool,
    pub webhook: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    pub ok: bool,
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignStatusRequest {
    pub id: Uuid,
    pub status: CampaignStatus,
}

#[derive(Debug, Serialize)]
pub struct ClientSummary {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<client::Model> for ClientSummary {
    fn from(model: client::Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            phone: model.phone,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriberSummary {
    pub user_id: i64,
    pub chat_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<telegram_user::Model> for SubscriberSummary {
    fn from(model: telegram_user::Model) -> Self {
        Self {
            user_id: model.user_id,
            chat_id: model.chat_id,
            first_name: model.first_name,
            last_name: model.last_name,
            username: model.username,
            phone: model.phone,
            photo_url: model.photo_url,
            created_at: model.created_at,
        }
    }
}

/// Leads and opted-in bot subscribers of the caller's tenant.
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub clients: Vec<ClientSummary>,
    pub telegram_users: Vec<SubscriberSummary>,
}
