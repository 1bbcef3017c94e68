use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "telegram_bot_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)] // One row per tenant
    pub tenant_id: Uuid,
    pub bot_token: Option<String>,
    pub start_message: Option<String>,
    pub stop_message: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
