use chrono::{NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    prelude::Expr,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entities::campaign;
use crate::db::enums::{CampaignStatus, PromotionType};

#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: CampaignStatus,
    pub image_url: Option<String>,
    pub starts_at: Option<NaiveDate>,
    pub ends_at: Option<NaiveDate>,
    pub promotion_type: Option<PromotionType>,
    pub promotion_value: Option<f64>,
}

pub async fn find_campaign<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    campaign_id: Uuid,
) -> Result<Option<campaign::Model>, DbErr> {
    campaign::Entity::find_by_id(campaign_id)
        .filter(campaign::Column::TenantId.eq(tenant_id))
        .one(db)
        .await
}

/// Newest first.
pub async fn list_campaigns<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> Result<Vec<campaign::Model>, DbErr> {
    campaign::Entity::find()
        .filter(campaign::Column::TenantId.eq(tenant_id))
        .order_by_desc(campaign::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn create_campaign<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    new_campaign: NewCampaign,
) -> Result<Uuid, DbErr> {
    let id = Uuid::new_v4();
    let model = campaign::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        name: Set(new_campaign.name),
        description: Set(new_campaign.description),
        status: Set(new_campaign.status),
        image_url: Set(new_campaign.image_url),
        starts_at: Set(new_campaign.starts_at),
        ends_at: Set(new_campaign.ends_at),
        promotion_type: Set(new_campaign.promotion_type),
        promotion_value: Set(new_campaign.promotion_value),
        created_at: Set(Utc::now()),
    };
    campaign::Entity::insert(model)
        .exec_without_returning(db)
        .await?;
    Ok(id)
}

/// Sets the status of a tenant's campaign. Returns the number of rows touched.
///
/// Publishing only matches a campaign that is not yet published, so of two
/// concurrent publish requests exactly one sees a row affected.
pub async fn update_campaign_status<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    campaign_id: Uuid,
    status: CampaignStatus,
) -> Result<u64, DbErr> {
    let mut update = campaign::Entity::update_many()
        .col_expr(campaign::Column::Status, Expr::value(status.to_string()))
        .filter(campaign::Column::Id.eq(campaign_id))
        .filter(campaign::Column::TenantId.eq(tenant_id));
    if status == CampaignStatus::Published {
        update = update.filter(campaign::Column::Status.ne(CampaignStatus::Published.to_string()));
    }
    let result = update.exec(db).await?;
    Ok(result.rows_affected)
}
