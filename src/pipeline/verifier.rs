use std::sync::Arc;

use crate::{domain::InboundEvent, pipeline::dedup::DedupStore};

#[derive(Debug, PartialEq)]
pub enum VerifyOutcome {
    /// Verification token mismatch. Reject, no processing.
    Unauthorized,
    /// URL verification handshake; echo the value back verbatim.
    Challenge(String),
    /// `event_id` already seen within the retention window.
    Duplicate,
    /// Envelope type the pipeline does not act on.
    Ignored,
    /// Token valid, event id recorded as in-flight.
    Accepted,
}

pub struct Verifier {
    expected_token: String,
    dedup: Arc<DedupStore>,
}

impl Verifier {
    pub fn new(expected_token: String, dedup: Arc<DedupStore>) -> Self {
        Self {
            expected_token,
            dedup,
        }
    }

    pub fn verify(&self, event: &InboundEvent) -> VerifyOutcome {
        match event {
            InboundEvent::UrlVerification { token, challenge } => {
                if !self.token_matches(token.as_deref()) {
                    VerifyOutcome::Unauthorized
                } else {
                    VerifyOutcome::Challenge(challenge.clone())
                }
            }
            InboundEvent::EventCallback { token, event_id, .. } => {
                if !self.token_matches(token.as_deref()) {
                    VerifyOutcome::Unauthorized
                } else if !self.dedup.check_and_insert(event_id) {
                    VerifyOutcome::Duplicate
                } else {
                    VerifyOutcome::Accepted
                }
            }
            InboundEvent::Other => VerifyOutcome::Ignored,
        }
    }

    fn token_matches(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(token) => constant_time_eq(token.as_bytes(), self.expected_token.as_bytes()),
            None => false,
        }
    }
}

/// Constant-time byte comparison; the token check is a security boundary.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::env::DedupConfig;

    fn verifier() -> Verifier {
        let dedup = Arc::new(DedupStore::new(&DedupConfig {
            window: Duration::from_secs(60),
            max_entries: 16,
        }));
        Verifier::new("secret-token".to_string(), dedup)
    }

    fn callback(token: Option<&str>, event_id: &str) -> InboundEvent {
        serde_json::from_value(serde_json::json!({
            "type": "event_callback",
            "token": token,
            "event_id": event_id,
            "event_time": 1_700_000_000,
            "event": {"type": "message"}
        }))
        .unwrap()
    }

    #[test]
    fn wrong_token_is_unauthorized() {
        let verifier = verifier();
        assert_eq!(
            verifier.verify(&callback(Some("wrong"), "Ev1")),
            VerifyOutcome::Unauthorized
        );
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let verifier = verifier();
        assert_eq!(
            verifier.verify(&callback(None, "Ev1")),
            VerifyOutcome::Unauthorized
        );
    }

    #[test]
    fn unauthorized_event_id_is_not_recorded() {
        let verifier = verifier();
        assert_eq!(
            verifier.verify(&callback(Some("wrong"), "Ev1")),
            VerifyOutcome::Unauthorized
        );
        // A later valid delivery of the same id must still be accepted.
        assert_eq!(
            verifier.verify(&callback(Some("secret-token"), "Ev1")),
            VerifyOutcome::Accepted
        );
    }

    #[test]
    fn valid_challenge_is_echoed() {
        let verifier = verifier();
        let event = InboundEvent::UrlVerification {
            token: Some("secret-token".to_string()),
            challenge: "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P".to_string(),
        };
        assert_eq!(
            verifier.verify(&event),
            VerifyOutcome::Challenge(
                "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P".to_string()
            )
        );
    }

    #[test]
    fn challenge_with_bad_token_is_unauthorized() {
        let verifier = verifier();
        let event = InboundEvent::UrlVerification {
            token: Some("wrong".to_string()),
            challenge: "abc".to_string(),
        };
        assert_eq!(verifier.verify(&event), VerifyOutcome::Unauthorized);
    }

    #[test]
    fn redelivered_event_id_is_duplicate() {
        let verifier = verifier();
        assert_eq!(
            verifier.verify(&callback(Some("secret-token"), "Ev1")),
            VerifyOutcome::Accepted
        );
        assert_eq!(
            verifier.verify(&callback(Some("secret-token"), "Ev1")),
            VerifyOutcome::Duplicate
        );
    }

    #[test]
    fn unknown_envelope_is_ignored() {
        let verifier = verifier();
        assert_eq!(verifier.verify(&InboundEvent::Other), VerifyOutcome::Ignored);
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokem"));
        assert!(!constant_time_eq(b"token", b"token1"));
        assert!(constant_time_eq(b"", b""));
    }
}
