use reqwest::Client;
use url::Url;

use crate::{
    config::SlackConfig,
    domain::FileInfo,
    slack::{
        types::{ApiEnvelope, ChatApiError, DeleteRequest, PostMessageRequest},
        ChatApi,
    },
};

const DELETE_URL: &str = "https://slack.com/api/chat.delete";
const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

pub struct SlackClient {
    http: Client,
    config: SlackConfig,
    max_download_bytes: usize,
}

impl SlackClient {
    pub fn new(http: Client, config: SlackConfig, max_download_bytes: usize) -> Self {
        Self {
            http,
            config,
            max_download_bytes,
        }
    }

    async fn call_api(&self, url: &str, body: &impl serde::Serialize) -> Result<(), ChatApiError> {
        let envelope: ApiEnvelope = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.ok {
            Ok(())
        } else {
            Err(ChatApiError::Api {
                code: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }
}

#[async_trait::async_trait]
impl ChatApi for SlackClient {
    async fn download_file(&self, file: &FileInfo) -> Result<Vec<u8>, ChatApiError> {
        let raw_url = file
            .url_private
            .as_deref()
            .ok_or(ChatApiError::MissingDownloadUrl)?;
        match Url::parse(raw_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ChatApiError::InvalidDownloadUrl(raw_url.to_string())),
        }

        let mut response = self
            .http
            .get(raw_url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?
            .error_for_status()?;

        if let Some(len) = response.content_length() {
            if len as usize > self.max_download_bytes {
                return Err(ChatApiError::TooLarge {
                    max_bytes: self.max_download_bytes,
                });
            }
        }

        // Content-Length can lie; enforce the cap again while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_download_bytes {
                return Err(ChatApiError::TooLarge {
                    max_bytes: self.max_download_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn delete_message(&self, channel: &str, ts: &str) -> Result<(), ChatApiError> {
        self.call_api(DELETE_URL, &DeleteRequest { channel, ts }).await
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatApiError> {
        self.call_api(POST_MESSAGE_URL, &PostMessageRequest { channel, text })
            .await
    }
}
