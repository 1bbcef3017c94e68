//! In-memory doubles for the store and the bot transport.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::db::entities::{campaign, client, telegram_bot_setting, telegram_user};
use crate::db::services::SubscriberProfile;
use crate::store::{StoreError, StoreProvider, TenantScopedStore};
use crate::telegram::models::{BotInfo, File, PhotoSize, ReplyKeyboardMarkup, UserProfilePhotos};
use crate::telegram::{BotToken, BotTransport, TransportError};

#[derive(Default)]
struct MemoryState {
    settings: HashMap<Uuid, telegram_bot_setting::Model>,
    users: Vec<telegram_user::Model>,
    clients: Vec<client::Model>,
    campaigns: Vec<campaign::Model>,
    next_user_row: i64,
    fail_writes: bool,
    fail_reads: bool,
    fail_bot_settings: bool,
    fail_subscriber_list: bool,
}

fn forced_failure() -> StoreError {
    StoreError::Database(sea_orm::DbErr::Custom("forced failure".to_string()))
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn configure_bot(
        &self,
        tenant_id: Uuid,
        token: Option<&str>,
        start: Option<&str>,
        stop: Option<&str>,
    ) {
        let now = Utc::now();
        self.state.lock().unwrap().settings.insert(
            tenant_id,
            telegram_bot_setting::Model {
                tenant_id,
                bot_token: token.map(str::to_string),
                start_message: start.map(str::to_string),
                stop_message: stop.map(str::to_string),
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn add_subscriber(&self, tenant_id: Uuid, user_id: i64, chat_id: i64, subscribed: bool) {
        let mut state = self.state.lock().unwrap();
        state.next_user_row += 1;
        let now = Utc::now();
        let row = telegram_user::Model {
            id: state.next_user_row,
            tenant_id,
            user_id,
            chat_id,
            first_name: None,
            last_name: None,
            username: None,
            phone: None,
            photo_url: None,
            subscribed,
            created_at: now,
            updated_at: now,
        };
        state.users.push(row);
    }

    pub fn subscribers(&self, tenant_id: Uuid) -> Vec<telegram_user::Model> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    pub fn add_client(&self, tenant_id: Uuid, full_name: &str, phone: &str) {
        self.state.lock().unwrap().clients.push(client::Model {
            id: Uuid::new_v4(),
            tenant_id,
            full_name: full_name.to_string(),
            phone: Some(phone.to_string()),
            created_at: Utc::now(),
        });
    }

    pub fn clients(&self, tenant_id: Uuid) -> Vec<client::Model> {
        self.state
            .lock()
            .unwrap()
            .clients
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect()
    }

    pub fn add_campaign(&self, campaign: campaign::Model) {
        self.state.lock().unwrap().campaigns.push(campaign);
    }

    /// Every write returns an error from now on.
    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    /// Every read except bot settings returns an error from now on.
    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn fail_bot_settings(&self) {
        self.state.lock().unwrap().fail_bot_settings = true;
    }

    /// Only the subscribed chat listing fails.
    pub fn fail_subscriber_list(&self) {
        self.state.lock().unwrap().fail_subscriber_list = true;
    }
}

impl StoreProvider for MemoryStore {
    fn for_tenant(&self, tenant_id: Uuid) -> Box<dyn TenantScopedStore> {
        Box::new(MemoryTenantStore {
            state: self.state.clone(),
            tenant_id,
        })
    }
}

struct MemoryTenantStore {
    state: Arc<Mutex<MemoryState>>,
    tenant_id: Uuid,
}

#[async_trait]
impl TenantScopedStore for MemoryTenantStore {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    async fn bot_settings(&self) -> Result<Option<telegram_bot_setting::Model>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_bot_settings {
            return Err(forced_failure());
        }
        Ok(state.settings.get(&self.tenant_id).cloned())
    }

    async fn upsert_subscriber(&self, profile: &SubscriberProfile) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(forced_failure());
        }
        let now = Utc::now();
        let tenant_id = self.tenant_id;
        if let Some(row) = state
            .users
            .iter_mut()
            .find(|u| u.tenant_id == tenant_id && u.user_id == profile.user_id)
        {
            row.chat_id = profile.chat_id;
            row.first_name = profile.first_name.clone();
            row.last_name = profile.last_name.clone();
            row.username = profile.username.clone();
            row.phone = profile.phone.clone();
            row.photo_url = profile.photo_url.clone();
            row.updated_at = now;
            return Ok(());
        }
        state.next_user_row += 1;
        let row = telegram_user::Model {
            id: state.next_user_row,
            tenant_id,
            user_id: profile.user_id,
            chat_id: profile.chat_id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            username: profile.username.clone(),
            phone: profile.phone.clone(),
            photo_url: profile.photo_url.clone(),
            subscribed: false,
            created_at: now,
            updated_at: now,
        };
        state.users.push(row);
        Ok(())
    }

    async fn set_subscribed(&self, user_id: i64, subscribed: bool) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(forced_failure());
        }
        let tenant_id = self.tenant_id;
        for row in state
            .users
            .iter_mut()
            .filter(|u| u.tenant_id == tenant_id && u.user_id == user_id)
        {
            row.subscribed = subscribed;
        }
        Ok(())
    }

    async fn client_exists(&self, phone: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(forced_failure());
        }
        Ok(state
            .clients
            .iter()
            .any(|c| c.tenant_id == self.tenant_id && c.phone.as_deref() == Some(phone)))
    }

    async fn insert_client(&self, full_name: &str, phone: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(forced_failure());
        }
        state.clients.push(client::Model {
            id: Uuid::new_v4(),
            tenant_id: self.tenant_id,
            full_name: full_name.to_string(),
            phone: Some(phone.to_string()),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn campaign(&self, campaign_id: Uuid) -> Result<Option<campaign::Model>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(forced_failure());
        }
        Ok(state
            .campaigns
            .iter()
            .find(|c| c.id == campaign_id && c.tenant_id == self.tenant_id)
            .cloned())
    }

    async fn subscribed_chat_ids(&self) -> Result<Vec<i64>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads || state.fail_subscriber_list {
            return Err(forced_failure());
        }
        Ok(state
            .users
            .iter()
            .filter(|u| u.tenant_id == self.tenant_id && u.subscribed)
            .map(|u| u.chat_id)
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: i64,
        text: String,
        keyboard: Option<ReplyKeyboardMarkup>,
    },
    Photo {
        chat_id: i64,
        photo: String,
        caption: String,
    },
}

#[derive(Default)]
struct TransportState {
    sent: Vec<Sent>,
    attempted_chats: Vec<i64>,
    failing_chats: HashSet<i64>,
    profile_photo: Option<(String, String)>,
    fail_photos: bool,
    fail_get_me: bool,
    fail_set_webhook: bool,
    webhooks: Vec<String>,
}

/// Records every outbound call. Sends to chats marked with `fail_chat` error out.
#[derive(Default)]
pub struct RecordingTransport {
    state: Mutex<TransportState>,
}

fn transport_failure() -> TransportError {
    TransportError::Api {
        description: "forced failure".to_string(),
    }
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_chat(&self, chat_id: i64) {
        self.state.lock().unwrap().failing_chats.insert(chat_id);
    }

    pub fn with_profile_photo(&self, file_id: &str, file_path: &str) {
        self.state.lock().unwrap().profile_photo =
            Some((file_id.to_string(), file_path.to_string()));
    }

    pub fn fail_photos(&self) {
        self.state.lock().unwrap().fail_photos = true;
    }

    pub fn fail_get_me(&self) {
        self.state.lock().unwrap().fail_get_me = true;
    }

    pub fn fail_set_webhook(&self) {
        self.state.lock().unwrap().fail_set_webhook = true;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn attempted_chats(&self) -> Vec<i64> {
        self.state.lock().unwrap().attempted_chats.clone()
    }

    pub fn webhooks(&self) -> Vec<String> {
        self.state.lock().unwrap().webhooks.clone()
    }

    fn record(&self, chat_id: i64, sent: Sent) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.attempted_chats.push(chat_id);
        if state.failing_chats.contains(&chat_id) {
            return Err(transport_failure());
        }
        state.sent.push(sent);
        Ok(())
    }
}

#[async_trait]
impl BotTransport for RecordingTransport {
    async fn send_message(
        &self,
        _token: &BotToken,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        self.record(
            chat_id,
            Sent::Text {
                chat_id,
                text: text.to_string(),
                keyboard: reply_markup.cloned(),
            },
        )
    }

    async fn send_photo(
        &self,
        _token: &BotToken,
        chat_id: i64,
        photo: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.record(
            chat_id,
            Sent::Photo {
                chat_id,
                photo: photo.to_string(),
                caption: caption.to_string(),
            },
        )
    }

    async fn get_user_profile_photos(
        &self,
        _token: &BotToken,
        _user_id: i64,
        _limit: u32,
    ) -> Result<UserProfilePhotos, TransportError> {
        let state = self.state.lock().unwrap();
        if state.fail_photos {
            return Err(transport_failure());
        }
        let photos = match &state.profile_photo {
            Some((file_id, _)) => vec![vec![PhotoSize {
                file_id: file_id.clone(),
                width: 160,
                height: 160,
            }]],
            None => Vec::new(),
        };
        Ok(UserProfilePhotos {
            total_count: photos.len() as u32,
            photos,
        })
    }

    async fn get_file(&self, _token: &BotToken, file_id: &str) -> Result<File, TransportError> {
        let state = self.state.lock().unwrap();
        let file_path = state
            .profile_photo
            .as_ref()
            .filter(|(id, _)| id == file_id)
            .map(|(_, path)| path.clone());
        Ok(File {
            file_id: file_id.to_string(),
            file_path,
        })
    }

    async fn get_me(&self, _token: &BotToken) -> Result<BotInfo, TransportError> {
        if self.state.lock().unwrap().fail_get_me {
            return Err(transport_failure());
        }
        Ok(BotInfo {
            id: 1,
            first_name: Some("Test Bot".to_string()),
            username: Some("test_bot".to_string()),
        })
    }

    async fn set_webhook(&self, _token: &BotToken, url: &str) -> Result<bool, TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_set_webhook {
            return Err(transport_failure());
        }
        state.webhooks.push(url.to_string());
        Ok(true)
    }

    fn file_url(&self, token: &BotToken, file_path: &str) -> String {
        format!("https://files.test/bot{}/{}", token.expose(), file_path)
    }
}
