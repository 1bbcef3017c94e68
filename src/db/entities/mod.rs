//! SeaORM entities for the tables this service reads and writes.

pub mod campaign;
pub mod client;
pub mod profile;
pub mod telegram_bot_setting;
pub mod telegram_user;
