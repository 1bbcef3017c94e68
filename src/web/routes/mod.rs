pub mod campaign_routes;
pub mod client_routes;
pub mod telegram_routes;
pub mod webhook_routes;
