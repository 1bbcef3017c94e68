//! Query functions grouped per table. Every function that touches tenant data
//! takes the tenant id explicitly and filters on it.

pub mod bot_settings_service;
pub mod campaign_service;
pub mod client_service;
pub mod profile_service;
pub mod subscriber_service;

pub use bot_settings_service::*;
pub use campaign_service::*;
pub use client_service::*;
pub use profile_service::*;
pub use subscriber_service::*;
