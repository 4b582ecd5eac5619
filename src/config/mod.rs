pub mod env;
mod loader;

pub use env::{AppConfig, ConfigError, ModerationConfig, RetryConfig, SlackConfig};
pub use loader::load_config;
