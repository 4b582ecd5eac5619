use std::{collections::HashMap, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub verification_token: String,
    pub slack: SlackConfig,
    pub moderation: ModerationConfig,
    pub retry: RetryConfig,
    pub dedup: DedupConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub max_image_bytes: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub access_token: String,
    pub admin_channel_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub thresholds: HashMap<String, f32>,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub window: Duration,
    pub max_entries: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub logs_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
