use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::ModerationConfig,
    domain::{ModerationLabel, ModerationResult},
    moderation::Classifier,
};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier returned status {0}")]
    Status(StatusCode),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClassifyError {
    /// Timeouts, connection failures, throttling and server errors are worth
    /// another attempt; anything else is a hard failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClassifyError::Status(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ClassifyError::Transport(err) => err.is_timeout() || err.is_connect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectLabelsRequest {
    #[serde(rename = "Image")]
    image: ImagePayload,
}

#[derive(Debug, Serialize)]
struct ImagePayload {
    #[serde(rename = "Bytes")]
    bytes: String,
}

#[derive(Debug, Deserialize)]
struct DetectLabelsResponse {
    #[serde(rename = "ModerationLabels", default)]
    moderation_labels: Vec<WireLabel>,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ParentName", default)]
    parent_name: String,
    #[serde(rename = "Confidence")]
    confidence: f32,
}

/// Transport to the external label classifier. Performs no interpretation of
/// the label hierarchy; that belongs to the policy evaluator.
pub struct ModerationClient {
    http: Client,
    config: ModerationConfig,
}

impl ModerationClient {
    pub fn new(http: Client, config: ModerationConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait::async_trait]
impl Classifier for ModerationClient {
    async fn detect_labels(&self, image: &[u8]) -> Result<ModerationResult, ClassifyError> {
        let request = DetectLabelsRequest {
            image: ImagePayload {
                bytes: BASE64.encode(image),
            },
        };

        let mut builder = self.http.post(&self.config.api_url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status));
        }

        let parsed: DetectLabelsResponse = response.json().await?;
        let labels = parsed
            .moderation_labels
            .into_iter()
            .map(|label| ModerationLabel {
                name: label.name,
                // An empty ParentName marks a top-level category.
                parent_name: Some(label.parent_name).filter(|p| !p.is_empty()),
                confidence: label.confidence,
            })
            .collect();
        Ok(ModerationResult { labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_retryable() {
        assert!(ClassifyError::Status(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(ClassifyError::Status(StatusCode::SERVICE_UNAVAILABLE).is_retryable());
        assert!(!ClassifyError::Status(StatusCode::BAD_REQUEST).is_retryable());
        assert!(!ClassifyError::Status(StatusCode::UNAUTHORIZED).is_retryable());
    }

    #[test]
    fn empty_parent_name_becomes_top_level() {
        let raw = r#"{"ModerationLabels":[
            {"Name":"Explicit Nudity","ParentName":"","Confidence":97.1},
            {"Name":"Suggestive","ParentName":"Explicit Nudity","Confidence":88.0}
        ]}"#;
        let parsed: DetectLabelsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.moderation_labels.len(), 2);
        assert!(parsed.moderation_labels[0].parent_name.is_empty());
        assert_eq!(parsed.moderation_labels[1].parent_name, "Explicit Nudity");
    }
}
