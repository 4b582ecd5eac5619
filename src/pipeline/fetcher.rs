use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::RetryConfig,
    domain::FileInfo,
    pipeline::retry,
    slack::{ChatApi, ChatApiError},
};

const SUPPORTED_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Error)]
pub enum FetchError {
    /// Not an image type the classifier accepts. Benign skip.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    /// Over the configured byte cap. Benign skip; oversized content is not
    /// itself evidence of a violation.
    #[error("file exceeds {max_bytes} byte limit")]
    TooLarge { max_bytes: usize },
    #[error("download failed: {0}")]
    Failed(#[source] ChatApiError),
}

impl FetchError {
    /// Benign outcomes acknowledge the event without remediation and
    /// without counting as a processing failure.
    pub fn is_benign_skip(&self) -> bool {
        matches!(self, FetchError::UnsupportedType(_) | FetchError::TooLarge { .. })
    }
}

/// Resolves a file reference to raw image bytes, enforcing the type
/// allow-list and byte cap before and after the download.
pub struct ImageFetcher {
    chat: Arc<dyn ChatApi>,
    max_bytes: usize,
    retry: RetryConfig,
}

impl ImageFetcher {
    pub fn new(chat: Arc<dyn ChatApi>, max_bytes: usize, retry: RetryConfig) -> Self {
        Self {
            chat,
            max_bytes,
            retry,
        }
    }

    pub async fn fetch(&self, file: &FileInfo) -> Result<Vec<u8>, FetchError> {
        let mimetype = file.mimetype.as_deref().unwrap_or("");
        if !SUPPORTED_TYPES.contains(&mimetype) {
            return Err(FetchError::UnsupportedType(mimetype.to_string()));
        }
        if let Some(size) = file.size {
            if size as usize > self.max_bytes {
                return Err(FetchError::TooLarge {
                    max_bytes: self.max_bytes,
                });
            }
        }

        let bytes = retry::with_backoff(
            &self.retry,
            "download_file",
            |err: &ChatApiError| matches!(err, ChatApiError::Transport(_)),
            || self.chat.download_file(file),
        )
        .await
        .map_err(|err| match err {
            ChatApiError::TooLarge { max_bytes } => FetchError::TooLarge { max_bytes },
            other => FetchError::Failed(other),
        })?;

        // The declared size already passed; trust only the actual bytes.
        if bytes.len() > self.max_bytes {
            return Err(FetchError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }
        Ok(bytes)
    }
}
