use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

use crate::db::entities::profile;

pub async fn get_profile<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<profile::Model>, DbErr> {
    profile::Entity::find_by_id(user_id).one(db).await
}
