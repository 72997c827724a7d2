pub mod config;
pub mod preferences;
