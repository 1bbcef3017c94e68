use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    prelude::Expr, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::db::entities::telegram_user;

/// Descriptive fields of a subscriber as seen on the latest inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberProfile {
    pub user_id: i64,
    pub chat_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

/// Inserts the subscriber or refreshes its descriptive fields.
/// `subscribed` is only written on insert.
pub async fn upsert_subscriber<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    profile: &SubscriberProfile,
) -> Result<(), DbErr> {
    let now = Utc::now();
    let model = telegram_user::ActiveModel {
        tenant_id: Set(tenant_id),
        user_id: Set(profile.user_id),
        chat_id: Set(profile.chat_id),
        first_name: Set(profile.first_name.clone()),
        last_name: Set(profile.last_name.clone()),
        username: Set(profile.username.clone()),
        phone: Set(profile.phone.clone()),
        photo_url: Set(profile.photo_url.clone()),
        subscribed: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    telegram_user::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([telegram_user::Column::TenantId, telegram_user::Column::UserId])
                .update_columns([
                    telegram_user::Column::ChatId,
                    telegram_user::Column::FirstName,
                    telegram_user::Column::LastName,
                    telegram_user::Column::Username,
                    telegram_user::Column::Phone,
                    telegram_user::Column::PhotoUrl,
                    telegram_user::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Flips the opt-in flag of one subscriber. Returns the number of rows touched.
pub async fn set_subscribed<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    user_id: i64,
    subscribed: bool,
) -> Result<u64, DbErr> {
    let result = telegram_user::Entity::update_many()
        .col_expr(telegram_user::Column::Subscribed, Expr::value(subscribed))
        .col_expr(telegram_user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(telegram_user::Column::TenantId.eq(tenant_id))
        .filter(telegram_user::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Chat ids of every subscriber of the tenant who is currently opted in.
pub async fn get_subscribed_chat_ids<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Vec<i64>, DbErr> {
    telegram_user::Entity::find()
        .select_only()
        .column(telegram_user::Column::ChatId)
        .filter(telegram_user::Column::TenantId.eq(tenant_id))
        .filter(telegram_user::Column::Subscribed.eq(true))
        .into_tuple::<i64>()
        .all(db)
        .await
}

/// Opted-in subscribers of the tenant, newest first.
pub async fn list_subscribed_users<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Vec<telegram_user::Model>, DbErr> {
    telegram_user::Entity::find()
        .filter(telegram_user::Column::TenantId.eq(tenant_id))
        .filter(telegram_user::Column::Subscribed.eq(true))
        .order_by_desc(telegram_user::Column::CreatedAt)
        .all(db)
        .await
}
