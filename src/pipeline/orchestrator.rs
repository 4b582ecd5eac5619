use std::sync::Arc;

use crate::{
    config::{AppConfig, RetryConfig},
    domain::{ChannelMessage, InboundEvent},
    infrastructure::notifier::OperatorNotifier,
    moderation::{self, Classifier, ClassifyError, Policy},
    pipeline::{
        dedup::DedupStore,
        fetcher::ImageFetcher,
        remediator::Remediator,
        retry,
        verifier::{Verifier, VerifyOutcome},
    },
    slack::ChatApi,
};

/// Synchronous reply owed to the webhook caller. Processing failures are
/// absorbed into `Ack` so the platform never enters a retry storm.
#[derive(Debug, PartialEq)]
pub enum WebhookReply {
    Ack,
    Challenge(String),
    Unauthorized,
}

/// Sequences verification, fetch, classification, evaluation and
/// remediation for one inbound event.
pub struct Orchestrator {
    verifier: Verifier,
    fetcher: ImageFetcher,
    classifier: Arc<dyn Classifier>,
    policy: Policy,
    remediator: Remediator,
    retry: RetryConfig,
    notifier: OperatorNotifier,
}

impl Orchestrator {
    pub fn new(
        config: &AppConfig,
        chat: Arc<dyn ChatApi>,
        classifier: Arc<dyn Classifier>,
        dedup: Arc<DedupStore>,
    ) -> Self {
        let policy = Policy::new(config.moderation.thresholds.clone());
        if policy.is_empty() {
            tracing::warn!(
                target: "pipeline",
                "no moderation thresholds configured; nothing will ever be flagged"
            );
        }
        Self {
            verifier: Verifier::new(config.verification_token.clone(), dedup),
            fetcher: ImageFetcher::new(chat.clone(), config.max_image_bytes, config.retry.clone()),
            classifier,
            policy,
            remediator: Remediator::new(chat.clone()),
            retry: config.retry.clone(),
            notifier: OperatorNotifier::new(chat, config.slack.admin_channel_id.clone()),
        }
    }

    pub async fn handle_event(&self, event: InboundEvent) -> WebhookReply {
        match self.verifier.verify(&event) {
            VerifyOutcome::Unauthorized => {
                tracing::warn!(target: "pipeline", "rejected event with invalid token");
                WebhookReply::Unauthorized
            }
            VerifyOutcome::Challenge(challenge) => {
                tracing::info!(target: "pipeline", "answering url verification challenge");
                WebhookReply::Challenge(challenge)
            }
            VerifyOutcome::Duplicate => {
                tracing::info!(target: "pipeline", "suppressed duplicate delivery");
                WebhookReply::Ack
            }
            VerifyOutcome::Ignored => WebhookReply::Ack,
            VerifyOutcome::Accepted => match event {
                InboundEvent::EventCallback {
                    event_id,
                    event_time,
                    event,
                    ..
                } => {
                    tracing::debug!(
                        target: "pipeline",
                        event_id = %event_id,
                        event_time,
                        "event accepted"
                    );
                    match ChannelMessage::from_callback(&event) {
                        Some(message) => self.process(&event_id, message).await,
                        None => {
                            tracing::debug!(
                                target: "pipeline",
                                event_id = %event_id,
                                "event carries no shared files; acknowledged"
                            );
                            WebhookReply::Ack
                        }
                    }
                }
                // Only event_callback envelopes verify as Accepted.
                _ => WebhookReply::Ack,
            },
        }
    }

    /// Runs the pipeline for an accepted event. Every failure is absorbed
    /// here; the caller always gets an acknowledgment.
    async fn process(&self, event_id: &str, message: ChannelMessage) -> WebhookReply {
        tracing::info!(
            target: "pipeline",
            event_id,
            channel = %message.channel_id,
            ts = %message.ts,
            user = message.user_id.as_deref(),
            files = message.files.len(),
            "processing file share"
        );

        for file in &message.files {
            let image = match self.fetcher.fetch(file).await {
                Ok(bytes) => bytes,
                Err(err) if err.is_benign_skip() => {
                    tracing::info!(
                        target: "pipeline",
                        event_id,
                        file_id = %file.id,
                        reason = %err,
                        "skipping file"
                    );
                    continue;
                }
                Err(err) => {
                    self.report_failure(event_id, "image download", &err).await;
                    return WebhookReply::Ack;
                }
            };

            let result = match retry::with_backoff(
                &self.retry,
                "detect_labels",
                ClassifyError::is_retryable,
                || self.classifier.detect_labels(&image),
            )
            .await
            {
                Ok(result) => result,
                Err(err) => {
                    // Never remediate on an incomplete moderation check.
                    self.report_failure(event_id, "classification", &err).await;
                    return WebhookReply::Ack;
                }
            };
            drop(image);

            let decision = moderation::evaluate(&result, &self.policy);
            if !decision.violates {
                tracing::debug!(
                    target: "pipeline",
                    event_id,
                    file_id = %file.id,
                    labels = result.labels.len(),
                    "no policy violation"
                );
                continue;
            }
            if let Some(matched) = &decision.matched_label {
                tracing::info!(
                    target: "pipeline",
                    event_id,
                    file_id = %file.id,
                    label = %matched.name,
                    confidence = matched.confidence,
                    "policy violation detected"
                );
            }

            let outcome = self.remediator.remediate(&decision, &message).await;
            if outcome.is_partial() {
                self.notifier
                    .alert(&format!(
                        "Partial remediation for event {event_id} in {channel}: \
                         deleted={deleted}, already_gone={gone}, notified={notified}.",
                        channel = message.channel_id,
                        deleted = outcome.deleted,
                        gone = outcome.already_gone,
                        notified = outcome.notified,
                    ))
                    .await;
            }
            // Deletion is message-level; one remediation covers the event.
            return WebhookReply::Ack;
        }

        WebhookReply::Ack
    }

    async fn report_failure(&self, event_id: &str, stage: &str, err: &(dyn std::fmt::Display + Sync)) {
        tracing::error!(
            target: "pipeline",
            event_id,
            stage,
            error = %err,
            "event processing failed; acknowledging without remediation"
        );
        self.notifier
            .alert(&format!("Event {event_id} failed during {stage}: {err}"))
            .await;
    }
}
