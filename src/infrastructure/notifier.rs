use std::sync::Arc;

use crate::slack::ChatApi;

/// Best-effort alerts to the configured admin channel. Failures are logged
/// and never block event acknowledgment.
pub struct OperatorNotifier {
    chat: Arc<dyn ChatApi>,
    admin_channel_id: Option<String>,
}

impl OperatorNotifier {
    pub fn new(chat: Arc<dyn ChatApi>, admin_channel_id: Option<String>) -> Self {
        Self {
            chat,
            admin_channel_id,
        }
    }

    pub async fn alert(&self, text: &str) {
        let Some(channel) = &self.admin_channel_id else {
            return;
        };
        if let Err(err) = self.chat.post_message(channel, text).await {
            tracing::warn!(
                target: "ops",
                error = %err,
                channel = %channel,
                "failed to send operator alert"
            );
        }
    }
}
