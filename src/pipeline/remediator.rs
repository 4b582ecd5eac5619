use std::sync::Arc;

use crate::{
    domain::{ChannelMessage, PolicyDecision, RemediationOutcome},
    slack::ChatApi,
};

/// Deletes flagged content and notifies the originating channel. The two
/// steps are deliberately never retried here: retrying would risk repeating
/// the delete attempt for an event the platform also redelivers.
pub struct Remediator {
    chat: Arc<dyn ChatApi>,
}

impl Remediator {
    pub fn new(chat: Arc<dyn ChatApi>) -> Self {
        Self { chat }
    }

    pub async fn remediate(
        &self,
        decision: &PolicyDecision,
        message: &ChannelMessage,
    ) -> RemediationOutcome {
        let category = decision
            .matched_label
            .as_ref()
            .map(|label| label.category().to_string())
            .unwrap_or_else(|| "prohibited content".to_string());

        let mut outcome = RemediationOutcome::default();

        match self
            .chat
            .delete_message(&message.channel_id, &message.ts)
            .await
        {
            Ok(()) => outcome.deleted = true,
            Err(err) if err.is_already_gone() => {
                outcome.already_gone = true;
                tracing::info!(
                    target: "remediation",
                    channel = %message.channel_id,
                    ts = %message.ts,
                    "message already removed"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: "remediation",
                    error = %err,
                    channel = %message.channel_id,
                    ts = %message.ts,
                    "failed to delete flagged message"
                );
            }
        }

        // Deletion failure never suppresses the notification; the channel
        // deserves transparency either way. Only the category is named,
        // never the confidence score.
        let text = if outcome.deleted {
            format!("An image was removed because it was classified as \"{category}\".")
        } else {
            format!(
                "An image was flagged as \"{category}\" and may already have been removed."
            )
        };

        match self.chat.post_message(&message.channel_id, &text).await {
            Ok(()) => outcome.notified = true,
            Err(err) => {
                tracing::error!(
                    target: "remediation",
                    error = %err,
                    channel = %message.channel_id,
                    "failed to post removal notice"
                );
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::{
        domain::{FileInfo, ModerationLabel},
        slack::ChatApiError,
    };

    #[derive(Default)]
    struct RecordingChat {
        deletes: Mutex<Vec<(String, String)>>,
        posts: Mutex<Vec<(String, String)>>,
        delete_error: Option<&'static str>,
        post_fails: bool,
    }

    #[async_trait::async_trait]
    impl ChatApi for RecordingChat {
        async fn download_file(&self, _file: &FileInfo) -> Result<Vec<u8>, ChatApiError> {
            unreachable!("remediator never downloads")
        }

        async fn delete_message(&self, channel: &str, ts: &str) -> Result<(), ChatApiError> {
            self.deletes
                .lock()
                .push((channel.to_string(), ts.to_string()));
            match self.delete_error {
                Some(code) => Err(ChatApiError::Api {
                    code: code.to_string(),
                }),
                None => Ok(()),
            }
        }

        async fn post_message(&self, channel: &str, text: &str) -> Result<(), ChatApiError> {
            self.posts
                .lock()
                .push((channel.to_string(), text.to_string()));
            if self.post_fails {
                Err(ChatApiError::Api {
                    code: "channel_not_found".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn decision(name: &str, parent: Option<&str>, confidence: f32) -> PolicyDecision {
        PolicyDecision {
            violates: true,
            matched_label: Some(ModerationLabel {
                name: name.to_string(),
                parent_name: parent.map(str::to_string),
                confidence,
            }),
        }
    }

    fn message() -> ChannelMessage {
        ChannelMessage {
            channel_id: "C024BE91L".to_string(),
            ts: "1700000000.000200".to_string(),
            user_id: Some("U061F7AUR".to_string()),
            files: vec![],
        }
    }

    #[tokio::test]
    async fn deletes_then_notifies_with_category() {
        let chat = Arc::new(RecordingChat::default());
        let outcome = Remediator::new(chat.clone())
            .remediate(&decision("Explicit Nudity", None, 97.0), &message())
            .await;

        assert!(outcome.deleted && outcome.notified && !outcome.is_partial());
        assert_eq!(chat.deletes.lock().len(), 1);
        let posts = chat.posts.lock();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].1.contains("Explicit Nudity"));
        assert!(!posts[0].1.contains("97"));
    }

    #[tokio::test]
    async fn child_label_notice_names_parent_category() {
        let chat = Arc::new(RecordingChat::default());
        Remediator::new(chat.clone())
            .remediate(
                &decision("Suggestive", Some("Explicit Nudity"), 92.0),
                &message(),
            )
            .await;
        let posts = chat.posts.lock();
        assert!(posts[0].1.contains("Explicit Nudity"));
        assert!(!posts[0].1.contains("Suggestive"));
    }

    #[tokio::test]
    async fn already_gone_still_notifies_and_is_not_partial() {
        let chat = Arc::new(RecordingChat {
            delete_error: Some("message_not_found"),
            ..Default::default()
        });
        let outcome = Remediator::new(chat.clone())
            .remediate(&decision("Explicit Nudity", None, 97.0), &message())
            .await;

        assert!(!outcome.deleted && outcome.already_gone && outcome.notified);
        assert!(!outcome.is_partial());
        let posts = chat.posts.lock();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].1.contains("already have been removed"));
    }

    #[tokio::test]
    async fn hard_delete_failure_still_notifies_but_is_partial() {
        let chat = Arc::new(RecordingChat {
            delete_error: Some("cant_delete_message"),
            ..Default::default()
        });
        let outcome = Remediator::new(chat.clone())
            .remediate(&decision("Violence", None, 90.0), &message())
            .await;

        assert!(!outcome.deleted && !outcome.already_gone && outcome.notified);
        assert!(outcome.is_partial());
        assert_eq!(chat.posts.lock().len(), 1);
    }

    #[tokio::test]
    async fn notify_failure_after_delete_is_partial() {
        let chat = Arc::new(RecordingChat {
            post_fails: true,
            ..Default::default()
        });
        let outcome = Remediator::new(chat.clone())
            .remediate(&decision("Violence", None, 90.0), &message())
            .await;

        assert!(outcome.deleted && !outcome.notified);
        assert!(outcome.is_partial());
        // Not retried: exactly one post attempt.
        assert_eq!(chat.posts.lock().len(), 1);
    }
}
