use chrono::NaiveDate;
use std::fmt::Write;

use crate::config::DEFAULT_DATE_FORMAT;
use crate::db::entities::campaign;
use crate::db::enums::PromotionType;

const MISSING_DATE: &str = "-";

/// Announcement text for a campaign, one item per line: headline, description,
/// promotion and period. Optional lines are left out when their fields are unset.
pub fn render_message(campaign: &campaign::Model, date_format: &str) -> String {
    let mut lines = vec![format!("📣 Nouvelle campagne: {}", campaign.name)];

    if let Some(description) = campaign.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(description.to_string());
    }

    if let (Some(kind), Some(value)) = (campaign.promotion_type, campaign.promotion_value) {
        lines.push(format!("Promotion: {}", promotion(kind, value)));
    }

    if campaign.starts_at.is_some() || campaign.ends_at.is_some() {
        lines.push(format!(
            "Période: {} → {}",
            date_or_dash(campaign.starts_at, date_format),
            date_or_dash(campaign.ends_at, date_format)
        ));
    }

    lines.join("\n")
}

// f64 Display drops a zero fraction: 50.0 prints as "50".
fn promotion(kind: PromotionType, value: f64) -> String {
    match kind {
        PromotionType::Percentage => format!("-{value}%"),
        PromotionType::Amount => format!("-{value}"),
    }
}

/// An unusable `date_format` falls back to [`DEFAULT_DATE_FORMAT`].
fn date_or_dash(date: Option<NaiveDate>, date_format: &str) -> String {
    let Some(date) = date else {
        return MISSING_DATE.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", date.format(date_format)).is_err() {
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}
