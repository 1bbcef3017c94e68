use chrono::Utc;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set, sea_query::OnConflict};
use uuid::Uuid;

use crate::db::entities::telegram_bot_setting;

/// Point lookup of a tenant's bot settings row.
pub async fn get_bot_settings<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Option<telegram_bot_setting::Model>, DbErr> {
    telegram_bot_setting::Entity::find_by_id(tenant_id).one(db).await
}

/// Creates or replaces a tenant's bot token and message templates.
pub async fn upsert_bot_settings<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    bot_token: &str,
    start_message: Option<String>,
    stop_message: Option<String>,
) -> Result<(), DbErr> {
    let now = Utc::now();
    let model = telegram_bot_setting::ActiveModel {
        tenant_id: Set(tenant_id),
        bot_token: Set(Some(bot_token.to_owned())),
        start_message: Set(start_message),
        stop_message: Set(stop_message),
        created_at: Set(now),
        updated_at: Set(now),
    };
    telegram_bot_setting::Entity::insert(model)
        .on_conflict(
            OnConflict::column(telegram_bot_setting::Column::TenantId)
                .update_columns([
                    telegram_bot_setting::Column::BotToken,
                    telegram_bot_setting::Column::StartMessage,
                    telegram_bot_setting::Column::StopMessage,
                    telegram_bot_setting::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}
