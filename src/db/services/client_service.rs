use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::db::entities::client;

pub async fn find_client_by_phone<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    phone: &str,
) -> Result<Option<client::Model>, DbErr> {
    client::Entity::find()
        .filter(client::Column::TenantId.eq(tenant_id))
        .filter(client::Column::Phone.eq(phone))
        .one(db)
        .await
}

/// Newest first.
pub async fn list_clients<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Vec<client::Model>, DbErr> {
    client::Entity::find()
        .filter(client::Column::TenantId.eq(tenant_id))
        .order_by_desc(client::Column::CreatedAt)
        .all(db)
        .await
}

/// Plain insert. Callers check for an existing `(tenant_id, phone)` first;
/// there is no unique constraint backing that check.
pub async fn insert_client<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    full_name: &str,
    phone: &str,
) -> Result<Uuid, DbErr> {
    let id = Uuid::new_v4();
    let model = client::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        full_name: Set(full_name.to_owned()),
        phone: Set(Some(phone.to_owned())),
        created_at: Set(Utc::now()),
    };
    client::Entity::insert(model)
        .exec_without_returning(db)
        .await?;
    Ok(id)
}
