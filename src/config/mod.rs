/// Database configuration and connection management
pub mod database;

/// Settings loading from config.toml and the environment
pub mod settings;

pub use settings::{Settings, load_default_settings};
