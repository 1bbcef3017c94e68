use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod client;
pub mod models;

pub use client::TelegramClient;
use models::{BotInfo, File, ReplyKeyboardMarkup, UserProfilePhotos};

#[derive(Error, Debug)]
pub enum TransportError {
    /// The request URL carries the bot token, so it is stripped before wrapping.
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Bot API returned non-success status: {status}. Body: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Bot API rejected the call: {description}")]
    Api { description: String },
    #[error("Bot API response had no result payload")]
    MissingResult,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.without_url())
    }
}

/// Secret token of one tenant's bot. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(***)")
    }
}

/// Calls into the external bot platform. Every call is scoped to one tenant's token.
///
/// Implementations are stateless and never retry; callers decide whether a
/// failure is swallowed or surfaced.
#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn send_message(
        &self,
        token: &BotToken,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), TransportError>;

    async fn send_photo(
        &self,
        token: &BotToken,
        chat_id: i64,
        photo: &str,
        caption: &str,
    ) -> Result<(), TransportError>;

    async fn get_user_profile_photos(
        &self,
        token: &BotToken,
        user_id: i64,
        limit: u32,
    ) -> Result<UserProfilePhotos, TransportError>;

    async fn get_file(&self, token: &BotToken, file_id: &str) -> Result<File, TransportError>;

    async fn get_me(&self, token: &BotToken) -> Result<BotInfo, TransportError>;

    async fn set_webhook(&self, token: &BotToken, url: &str) -> Result<bool, TransportError>;

    /// Downloadable URL for a `file_path` returned by `get_file`.
    fn file_url(&self, token: &BotToken, file_path: &str) -> String;
}
