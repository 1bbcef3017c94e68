pub mod bot_config;
pub mod campaigns;
pub mod config;
pub mod db;
pub mod ingest;
pub mod store;
pub mod telegram;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
