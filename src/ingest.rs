//! Inbound update processing for one tenant's bot.
//!
//! Every update runs the same sequence: bot config check, sender extraction,
//! best-effort photo lookup, subscriber upsert, lead capture, then command
//! dispatch. Store and transport failures are logged and swallowed so the
//! platform never sees a retry-triggering error; every mutation is an upsert or
//! an existence-checked insert, which keeps redelivery harmless.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bot_config::{self, BotConfig, SHARE_CONTACT_LABEL};
use crate::db::services::SubscriberProfile;
use crate::store::{StoreProvider, TenantScopedStore};
use crate::telegram::models::{Message, ReplyKeyboardMarkup, Update};
use crate::telegram::{BotToken, BotTransport};

/// Name given to a lead when the sender has neither a name nor a username.
pub const FALLBACK_CLIENT_NAME: &str = "Client";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Other,
}

impl Command {
    /// Case-sensitive prefix match after leading whitespace. The command must end
    /// at a word boundary: `/start@shop_bot` and `/start now` match, `/starter` does not.
    pub fn classify(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim_start) else {
            return Command::Other;
        };
        if matches_command(text, "/start") {
            Command::Start
        } else if matches_command(text, "/stop") {
            Command::Stop
        } else {
            Command::Other
        }
    }
}

fn matches_command(text: &str, command: &str) -> bool {
    match text.strip_prefix(command) {
        Some(rest) => !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    }
}

/// Sender details carried by one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingProfile {
    pub user_id: i64,
    pub chat_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
}

impl IncomingProfile {
    /// `None` when the chat id or the sender id is missing.
    pub fn from_message(message: &Message) -> Option<Self> {
        let chat_id = message.chat.as_ref()?.id?;
        let from = message.from.as_ref()?;
        let user_id = from.id?;
        Some(Self {
            user_id,
            chat_id,
            first_name: non_empty(from.first_name.as_deref()),
            last_name: non_empty(from.last_name.as_deref()),
            username: non_empty(from.username.as_deref()),
            phone: message
                .contact
                .as_ref()
                .and_then(|c| non_empty(c.phone_number.as_deref())),
        })
    }

    /// First and last name, else the username, else [`FALLBACK_CLIENT_NAME`].
    pub fn full_name(&self) -> String {
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.trim().is_empty() {
            return joined.trim().to_string();
        }
        self.username
            .clone()
            .unwrap_or_else(|| FALLBACK_CLIENT_NAME.to_string())
    }

    fn to_subscriber(&self, photo_url: Option<String>) -> SubscriberProfile {
        SubscriberProfile {
            user_id: self.user_id,
            chat_id: self.chat_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            phone: self.phone.clone(),
            photo_url,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUpdate {
    pub command: Command,
    pub subscriber_saved: bool,
    pub lead_created: bool,
    pub reply_sent: bool,
}

/// What happened to one update. Every variant is a success from the platform's
/// point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    NoBotConfigured,
    /// Bot settings could not be read.
    ConfigUnavailable,
    NoMessage,
    MissingSender,
    Processed(ProcessedUpdate),
}

#[derive(Clone)]
pub struct UpdateIngestor {
    stores: Arc<dyn StoreProvider>,
    transport: Arc<dyn BotTransport>,
}

impl UpdateIngestor {
    pub fn new(stores: Arc<dyn StoreProvider>, transport: Arc<dyn BotTransport>) -> Self {
        Self { stores, transport }
    }

    pub async fn handle_update(&self, tenant_id: Uuid, update: Update) -> IngestOutcome {
        let store = self.stores.for_tenant(tenant_id);

        let config = match bot_config::load(store.as_ref()).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!(%tenant_id, "No bot token configured, ignoring update.");
                return IngestOutcome::NoBotConfigured;
            }
            Err(e) => {
                warn!(%tenant_id, error = %e, "Failed to load bot settings, ignoring update.");
                return IngestOutcome::ConfigUnavailable;
            }
        };

        let Some(message) = update.message else {
            debug!(%tenant_id, update_id = ?update.update_id, "Update carries no message.");
            return IngestOutcome::NoMessage;
        };
        let Some(incoming) = IncomingProfile::from_message(&message) else {
            debug!(%tenant_id, "Message has no chat or sender id.");
            return IngestOutcome::MissingSender;
        };

        let photo_url = self.resolve_photo(&config.token, incoming.user_id).await;
        let subscriber_saved = match store
            .upsert_subscriber(&incoming.to_subscriber(photo_url))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(%tenant_id, user_id = incoming.user_id, error = %e, "Failed to save subscriber.");
                false
            }
        };

        let lead_created = match incoming.phone.as_deref() {
            Some(phone) => record_lead(store.as_ref(), &incoming, phone).await,
            None => false,
        };

        let command = Command::classify(message.text.as_deref());
        let reply_sent = match command {
            Command::Start => self.subscribe(store.as_ref(), &config, &incoming, true).await,
            Command::Stop => self.subscribe(store.as_ref(), &config, &incoming, false).await,
            Command::Other => false,
        };

        IngestOutcome::Processed(ProcessedUpdate {
            command,
            subscriber_saved,
            lead_created,
            reply_sent,
        })
    }

    /// First size of the newest profile photo, as a downloadable URL.
    async fn resolve_photo(&self, token: &BotToken, user_id: i64) -> Option<String> {
        let photos = match self.transport.get_user_profile_photos(token, user_id, 1).await {
            Ok(photos) => photos,
            Err(e) => {
                warn!(user_id, error = %e, "Profile photo lookup failed.");
                return None;
            }
        };
        let file_id = photos.first_file_id()?;
        match self.transport.get_file(token, file_id).await {
            Ok(file) => file
                .file_path
                .map(|path| self.transport.file_url(token, &path)),
            Err(e) => {
                warn!(user_id, error = %e, "Profile photo file resolution failed.");
                None
            }
        }
    }

    /// Flips the opt-in flag and sends the matching reply. Returns whether the
    /// reply went out.
    async fn subscribe(
        &self,
        store: &dyn TenantScopedStore,
        config: &BotConfig,
        incoming: &IncomingProfile,
        subscribed: bool,
    ) -> bool {
        let tenant_id = store.tenant_id();
        if let Err(e) = store.set_subscribed(incoming.user_id, subscribed).await {
            warn!(%tenant_id, user_id = incoming.user_id, subscribed, error = %e, "Failed to update subscription.");
        }

        let keyboard;
        let (text, markup) = if subscribed {
            keyboard = ReplyKeyboardMarkup::share_contact(SHARE_CONTACT_LABEL);
            (config.start_reply(), Some(&keyboard))
        } else {
            (config.stop_reply(), None)
        };

        match self
            .transport
            .send_message(&config.token, incoming.chat_id, &text, markup)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(%tenant_id, chat_id = incoming.chat_id, error = %e, "Failed to send reply.");
                false
            }
        }
    }
}

/// Inserts a client for `phone` unless one already exists. A failed lookup
/// skips the insert.
async fn record_lead(store: &dyn TenantScopedStore, incoming: &IncomingProfile, phone: &str) -> bool {
    let tenant_id = store.tenant_id();
    match store.client_exists(phone).await {
        Ok(true) => false,
        Ok(false) => match store.insert_client(&incoming.full_name(), phone).await {
            Ok(()) => {
                info!(%tenant_id, user_id = incoming.user_id, "New lead captured from contact share.");
                true
            }
            Err(e) => {
                warn!(%tenant_id, error = %e, "Failed to insert lead.");
                false
            }
        },
        Err(e) => {
            warn!(%tenant_id, error = %e, "Lead lookup failed, skipping insert.");
            false
        }
    }
}
