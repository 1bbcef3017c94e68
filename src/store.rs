//! The relational store as seen by ingestion and broadcast.
//!
//! Handles are obtained per tenant from a [`StoreProvider`]; the tenant id is
//! bound at that point and every query a [`TenantScopedStore`] issues is
//! filtered by it. Nothing downstream can pass a different tenant.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::db::entities::{campaign, telegram_bot_setting};
use crate::db::services::{self, SubscriberProfile};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[async_trait]
pub trait TenantScopedStore: Send + Sync {
    fn tenant_id(&self) -> Uuid;

    async fn bot_settings(&self) -> Result<Option<telegram_bot_setting::Model>, StoreError>;

    /// Insert-or-refresh keyed by `(tenant, profile.user_id)`. Never changes `subscribed`
    /// of an existing row.
    async fn upsert_subscriber(&self, profile: &SubscriberProfile) -> Result<(), StoreError>;

    async fn set_subscribed(&self, user_id: i64, subscribed: bool) -> Result<(), StoreError>;

    async fn client_exists(&self, phone: &str) -> Result<bool, StoreError>;

    async fn insert_client(&self, full_name: &str, phone: &str) -> Result<(), StoreError>;

    async fn campaign(&self, campaign_id: Uuid) -> Result<Option<campaign::Model>, StoreError>;

    async fn subscribed_chat_ids(&self) -> Result<Vec<i64>, StoreError>;
}

pub trait StoreProvider: Send + Sync {
    fn for_tenant(&self, tenant_id: Uuid) -> Box<dyn TenantScopedStore>;
}

/// Service-level store over the shared Postgres connection pool.
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Arc<Self> {
        Arc::new(Self { db })
    }
}

impl StoreProvider for DbStore {
    fn for_tenant(&self, tenant_id: Uuid) -> Box<dyn TenantScopedStore> {
        Box::new(DbTenantStore {
            db: self.db.clone(),
            tenant_id,
        })
    }
}

struct DbTenantStore {
    db: DatabaseConnection,
    tenant_id: Uuid,
}

#[async_trait]
impl TenantScopedStore for DbTenantStore {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    async fn bot_settings(&self) -> Result<Option<telegram_bot_setting::Model>, StoreError> {
        Ok(services::get_bot_settings(&self.db, self.tenant_id).await?)
    }

    async fn upsert_subscriber(&self, profile: &SubscriberProfile) -> Result<(), StoreError> {
        Ok(services::upsert_subscriber(&self.db, self.tenant_id, profile).await?)
    }

    async fn set_subscribed(&self, user_id: i64, subscribed: bool) -> Result<(), StoreError> {
        services::set_subscribed(&self.db, self.tenant_id, user_id, subscribed).await?;
        Ok(())
    }

    async fn client_exists(&self, phone: &str) -> Result<bool, StoreError> {
        let existing = services::find_client_by_phone(&self.db, self.tenant_id, phone).await?;
        Ok(existing.is_some())
    }

    async fn insert_client(&self, full_name: &str, phone: &str) -> Result<(), StoreError> {
        services::insert_client(&self.db, self.tenant_id, full_name, phone).await?;
        Ok(())
    }

    async fn campaign(&self, campaign_id: Uuid) -> Result<Option<campaign::Model>, StoreError> {
        Ok(services::find_campaign(&self.db, self.tenant_id, campaign_id).await?)
    }

    async fn subscribed_chat_ids(&self) -> Result<Vec<i64>, StoreError> {
        Ok(services::get_subscribed_chat_ids(&self.db, self.tenant_id).await?)
    }
}
