use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a campaign. `Draft -> Published` is the only transition that
/// triggers a broadcast.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "campaign_status")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignStatus::Draft => f.write_str("draft"),
            CampaignStatus::Published => f.write_str("published"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "promotion_type")]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "amount")]
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "business_admin")]
    BusinessAdmin,
    #[sea_orm(string_value = "business_members")]
    BusinessMembers,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::BusinessAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_roles_manage_tenant() {
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(UserRole::BusinessAdmin.is_admin());
        assert!(!UserRole::BusinessMembers.is_admin());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(CampaignStatus::Published).unwrap(),
            serde_json::json!("published")
        );
        let parsed: PromotionType = serde_json::from_str("\"amount\"").unwrap();
        assert_eq!(parsed, PromotionType::Amount);
    }
}
