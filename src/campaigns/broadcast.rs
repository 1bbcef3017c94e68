use futures::{StreamExt, stream};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::render::render_message;
use crate::bot_config;
use crate::store::{StoreError, StoreProvider};
use crate::telegram::{BotToken, BotTransport};

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("Broadcast aborted: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub campaign_id: Uuid,
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    CampaignNotFound,
    NoBotConfigured,
    Delivered(BroadcastReport),
}

/// Sends a published campaign to every subscribed chat of its tenant.
///
/// Each recipient is independent: a failed send is logged and counted, never
/// retried, and never stops the remaining sends.
#[derive(Clone)]
pub struct Broadcaster {
    stores: Arc<dyn StoreProvider>,
    transport: Arc<dyn BotTransport>,
    date_format: Arc<str>,
    concurrency: usize,
}

impl Broadcaster {
    pub fn new(
        stores: Arc<dyn StoreProvider>,
        transport: Arc<dyn BotTransport>,
        date_format: impl Into<Arc<str>>,
        concurrency: usize,
    ) -> Self {
        Self {
            stores,
            transport,
            date_format: date_format.into(),
            concurrency: concurrency.max(1),
        }
    }

    pub async fn broadcast(
        &self,
        tenant_id: Uuid,
        campaign_id: Uuid,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let store = self.stores.for_tenant(tenant_id);

        let Some(campaign) = store.campaign(campaign_id).await? else {
            debug!(%tenant_id, %campaign_id, "Campaign not found, nothing to broadcast.");
            return Ok(BroadcastOutcome::CampaignNotFound);
        };
        let Some(config) = bot_config::load(store.as_ref()).await? else {
            debug!(%tenant_id, %campaign_id, "No bot token configured, skipping broadcast.");
            return Ok(BroadcastOutcome::NoBotConfigured);
        };
        let chat_ids = store.subscribed_chat_ids().await?;

        let text = render_message(&campaign, &self.date_format);
        let image_url = campaign
            .image_url
            .as_deref()
            .filter(|url| !url.trim().is_empty());

        let sends: Vec<_> = chat_ids
            .iter()
            .map(|&chat_id| self.deliver(&config.token, chat_id, &text, image_url))
            .collect();
        let results: Vec<bool> = stream::iter(sends)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let sent = results.iter().filter(|ok| **ok).count();
        let report = BroadcastReport {
            campaign_id,
            recipients: results.len(),
            sent,
            failed: results.len() - sent,
        };
        info!(
            %tenant_id,
            %campaign_id,
            recipients = report.recipients,
            sent = report.sent,
            failed = report.failed,
            "Campaign broadcast finished."
        );
        Ok(BroadcastOutcome::Delivered(report))
    }

    /// Runs [`Broadcaster::broadcast`] in the background. Errors are logged.
    pub fn spawn_broadcast(&self, tenant_id: Uuid, campaign_id: Uuid) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            if let Err(e) = broadcaster.broadcast(tenant_id, campaign_id).await {
                error!(%tenant_id, %campaign_id, error = %e, "Campaign broadcast failed.");
            }
        })
    }

    async fn deliver(
        &self,
        token: &BotToken,
        chat_id: i64,
        text: &str,
        image_url: Option<&str>,
    ) -> bool {
        let result = match image_url {
            Some(photo) => self.transport.send_photo(token, chat_id, photo, text).await,
            None => self.transport.send_message(token, chat_id, text, None).await,
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(chat_id, error = %e, "Campaign send failed.");
                false
            }
        }
    }
}
