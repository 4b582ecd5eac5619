mod client;
pub mod types;

pub use client::SlackClient;
pub use types::ChatApiError;

use crate::domain::FileInfo;

/// Chat platform operations the pipeline depends on. Object-safe so tests
/// can substitute recording fakes for the real Web API client.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    async fn download_file(&self, file: &FileInfo) -> Result<Vec<u8>, ChatApiError>;
    async fn delete_message(&self, channel: &str, ts: &str) -> Result<(), ChatApiError>;
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatApiError>;
}
