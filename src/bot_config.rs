//! Per-tenant bot configuration: token, reply templates and webhook registration.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::entities::telegram_bot_setting;
use crate::store::{StoreError, TenantScopedStore};
use crate::telegram::{BotToken, BotTransport};

pub const DEFAULT_START_MESSAGE: &str = "Bienvenue! Vous recevrez les campagnes publiées ici.";
pub const DEFAULT_STOP_MESSAGE: &str =
    "Vous ne recevrez plus de notifications. Tapez /start pour reprendre.";
pub const SHARE_CONTACT_LABEL: &str = "Partager mon contact";

/// A tenant bot that is ready to talk: the token is present and non-blank.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: BotToken,
    pub start_template: Option<String>,
    pub stop_template: Option<String>,
}

impl BotConfig {
    pub fn from_settings(settings: telegram_bot_setting::Model) -> Option<Self> {
        let token = settings
            .bot_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())?;
        Some(Self {
            token: BotToken::new(token),
            start_template: settings.start_message,
            stop_template: settings.stop_message,
        })
    }

    /// Welcome text followed by the contact-sharing hint.
    pub fn start_reply(&self) -> String {
        let welcome = non_blank(self.start_template.as_deref()).unwrap_or(DEFAULT_START_MESSAGE);
        format!(
            "{welcome}\nPour partager votre téléphone, utilisez le bouton \"{SHARE_CONTACT_LABEL}\"."
        )
    }

    pub fn stop_reply(&self) -> String {
        non_blank(self.stop_template.as_deref())
            .unwrap_or(DEFAULT_STOP_MESSAGE)
            .to_string()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Reads the tenant's bot configuration. `None` when no usable token is set.
pub async fn load(store: &dyn TenantScopedStore) -> Result<Option<BotConfig>, StoreError> {
    Ok(store.bot_settings().await?.and_then(BotConfig::from_settings))
}

pub fn webhook_url(site_url: &str, tenant_id: Uuid) -> String {
    format!(
        "{}/api/telegram/webhook/{}",
        site_url.trim_end_matches('/'),
        tenant_id
    )
}

/// Points the bot platform at this tenant's webhook. Failures are logged and
/// reported as `false`.
pub async fn register_webhook(
    transport: &dyn BotTransport,
    token: &BotToken,
    site_url: &str,
    tenant_id: Uuid,
) -> bool {
    let url = webhook_url(site_url, tenant_id);
    match transport.set_webhook(token, &url).await {
        Ok(registered) => {
            info!(%tenant_id, registered, "Webhook registration answered.");
            registered
        }
        Err(e) => {
            warn!(%tenant_id, error = %e, "Webhook registration failed.");
            false
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BotIdentity {
    pub bot_name: Option<String>,
    pub bot_username: Option<String>,
    pub deep_link: Option<String>,
}

/// Best-effort `getMe` lookup used by the settings screen.
pub async fn describe_bot(transport: &dyn BotTransport, token: &BotToken) -> BotIdentity {
    match transport.get_me(token).await {
        Ok(me) => BotIdentity {
            deep_link: me.username.as_ref().map(|u| format!("https://t.me/{u}")),
            bot_name: me.first_name,
            bot_username: me.username,
        },
        Err(e) => {
            warn!(error = %e, "getMe failed, bot identity unavailable.");
            BotIdentity::default()
        }
    }
}
