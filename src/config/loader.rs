use std::{collections::HashMap, env, time::Duration};

use super::env::{
    AppConfig, ConfigError, DedupConfig, LoggingConfig, ModerationConfig, RetryConfig,
    ServerConfig, SlackConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let verification_token = env::var("VERIFICATION_TOKEN")
            .map_err(|_| ConfigError::Missing("VERIFICATION_TOKEN"))?;

        let slack = SlackConfig {
            access_token: env::var("SLACK_ACCESS_TOKEN")
                .map_err(|_| ConfigError::Missing("SLACK_ACCESS_TOKEN"))?,
            admin_channel_id: env::var("ADMIN_CHANNEL_ID").ok().filter(|v| !v.is_empty()),
        };

        let moderation = ModerationConfig {
            api_url: env::var("MODERATION_API_URL")
                .map_err(|_| ConfigError::Missing("MODERATION_API_URL"))?,
            api_key: env::var("MODERATION_API_KEY").ok().filter(|v| !v.is_empty()),
            thresholds: parse_thresholds(
                env::var("MODERATION_THRESHOLDS").unwrap_or_default().as_str(),
            )?,
        };

        let retry = RetryConfig {
            max_attempts: parse_uint("RETRY_MAX_ATTEMPTS").unwrap_or(3) as u32,
            base_delay: Duration::from_millis(parse_uint("RETRY_BASE_DELAY_MS").unwrap_or(200)),
            max_delay: Duration::from_millis(parse_uint("RETRY_MAX_DELAY_MS").unwrap_or(5_000)),
        };

        let dedup = DedupConfig {
            window: Duration::from_secs(parse_uint("DEDUP_WINDOW_SECS").unwrap_or(900)),
            max_entries: parse_uint("DEDUP_MAX_ENTRIES").unwrap_or(4_096) as usize,
        };

        let server = ServerConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_uint("PORT").unwrap_or(8_080) as u16,
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        // Default cap is 5 MiB.
        let max_image_bytes = parse_uint("MAX_IMAGE_BYTES").unwrap_or(5_242_880) as usize;

        let request_timeout =
            Duration::from_millis(parse_uint("REQUEST_TIMEOUT_MS").unwrap_or(10_000));

        Ok(Self {
            verification_token,
            slack,
            moderation,
            retry,
            dedup,
            server,
            logging,
            max_image_bytes,
            request_timeout,
        })
    }
}

/// Parses `"Explicit Nudity=80, Violence=90"` into a threshold map.
fn parse_thresholds(raw: &str) -> Result<HashMap<String, f32>, ConfigError> {
    let mut thresholds = HashMap::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, value) = part.split_once('=').ok_or_else(|| ConfigError::Invalid {
            key: "MODERATION_THRESHOLDS",
            value: part.to_string(),
        })?;
        let confidence = value
            .trim()
            .parse::<f32>()
            .map_err(|_| ConfigError::Invalid {
                key: "MODERATION_THRESHOLDS",
                value: part.to_string(),
            })?;
        thresholds.insert(name.trim().to_string(), confidence);
    }
    Ok(thresholds)
}

fn parse_uint(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_threshold_pairs() {
        let map = parse_thresholds("Explicit Nudity=80, Violence=92.5").unwrap();
        assert_eq!(map.get("Explicit Nudity"), Some(&80.0));
        assert_eq!(map.get("Violence"), Some(&92.5));
    }

    #[test]
    fn empty_threshold_string_is_empty_map() {
        assert!(parse_thresholds("").unwrap().is_empty());
    }

    #[test]
    fn malformed_threshold_pair_is_rejected() {
        assert!(parse_thresholds("Explicit Nudity").is_err());
        assert!(parse_thresholds("Violence=high").is_err());
    }
}
