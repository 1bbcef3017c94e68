use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use super::models::{
    ApiResponse, BotInfo, File, GetFile, GetUserProfilePhotos, ReplyKeyboardMarkup, SendMessage,
    SendPhoto, SetWebhook, UserProfilePhotos,
};
use super::{BotToken, BotTransport, TransportError};

/// Bot API client over HTTPS. One instance serves every tenant; the token is
/// supplied per call.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_url: String,
}

impl TelegramClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn method_url(&self, token: &BotToken, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, token.expose(), method)
    }

    async fn call<P, R>(&self, token: &BotToken, method: &str, payload: &P) -> Result<R, TransportError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!(method, "Calling Bot API.");
        let response = self
            .client
            .post(self.method_url(token, method))
            .json(payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(TransportError::Status { status, body });
        }

        let envelope: ApiResponse<R> = response.json().await?;
        if !envelope.ok {
            return Err(TransportError::Api {
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }
        envelope.result.ok_or(TransportError::MissingResult)
    }
}

#[async_trait]
impl BotTransport for TelegramClient {
    async fn send_message(
        &self,
        token: &BotToken,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&ReplyKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        let payload = SendMessage {
            chat_id,
            text,
            reply_markup,
        };
        self.call::<_, serde_json::Value>(token, "sendMessage", &payload)
            .await
            .map(|_| ())
    }

    async fn send_photo(
        &self,
        token: &BotToken,
        chat_id: i64,
        photo: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        let payload = SendPhoto {
            chat_id,
            photo,
            caption,
        };
        self.call::<_, serde_json::Value>(token, "sendPhoto", &payload)
            .await
            .map(|_| ())
    }

    async fn get_user_profile_photos(
        &self,
        token: &BotToken,
        user_id: i64,
        limit: u32,
    ) -> Result<UserProfilePhotos, TransportError> {
        self.call(
            token,
            "getUserProfilePhotos",
            &GetUserProfilePhotos { user_id, limit },
        )
        .await
    }

    async fn get_file(&self, token: &BotToken, file_id: &str) -> Result<File, TransportError> {
        self.call(token, "getFile", &GetFile { file_id }).await
    }

    async fn get_me(&self, token: &BotToken) -> Result<BotInfo, TransportError> {
        self.call(token, "getMe", &serde_json::json!({})).await
    }

    async fn set_webhook(&self, token: &BotToken, url: &str) -> Result<bool, TransportError> {
        self.call(token, "setWebhook", &SetWebhook { url }).await
    }

    fn file_url(&self, token: &BotToken, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_url, token.expose(), file_path)
    }
}
