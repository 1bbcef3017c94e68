//! Campaign announcements: message rendering and fan-out to subscribers.

pub mod broadcast;
pub mod render;

pub use crate::db::enums::{CampaignStatus, PromotionType};
pub use broadcast::{BroadcastError, BroadcastOutcome, BroadcastReport, Broadcaster};
pub use render::render_message;

/// A broadcast is due only when a campaign moves into `Published` from another state.
pub fn should_broadcast(previous: Option<CampaignStatus>, next: CampaignStatus) -> bool {
    next == CampaignStatus::Published && previous != Some(CampaignStatus::Published)
}
