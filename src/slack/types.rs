use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Web API response envelope shared by `chat.delete` and `chat.postMessage`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub channel: &'a str,
    pub ts: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Error)]
pub enum ChatApiError {
    #[error("slack api error: {code}")]
    Api { code: String },
    #[error("file has no private download url")]
    MissingDownloadUrl,
    #[error("download url is not http(s): {0}")]
    InvalidDownloadUrl(String),
    #[error("download exceeded {max_bytes} bytes")]
    TooLarge { max_bytes: usize },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ChatApiError {
    /// Delete errors meaning the content is gone already. Treated as success
    /// so remediation stays idempotent under redelivery.
    pub fn is_already_gone(&self) -> bool {
        match self {
            ChatApiError::Api { code } => matches!(
                code.as_str(),
                "message_not_found" | "file_not_found" | "file_deleted" | "already_deleted"
            ),
            _ => false,
        }
    }
}
