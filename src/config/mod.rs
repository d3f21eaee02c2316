/// Database configuration and connection management
pub mod database;

/// Application settings from environment variables and config.toml
pub mod settings;

pub use settings::Settings;
