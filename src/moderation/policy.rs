use std::collections::HashMap;

use crate::domain::{ModerationLabel, ModerationResult, PolicyDecision};

/// Per-label (or per-category) minimum confidence thresholds.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    thresholds: HashMap<String, f32>,
}

impl Policy {
    pub fn new(thresholds: HashMap<String, f32>) -> Self {
        Self { thresholds }
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Threshold for a label: its own name first, then its parent category.
    fn threshold_for(&self, label: &ModerationLabel) -> Option<f32> {
        self.thresholds
            .get(&label.name)
            .or_else(|| {
                label
                    .parent_name
                    .as_ref()
                    .and_then(|parent| self.thresholds.get(parent))
            })
            .copied()
    }
}

/// Pure decision function: picks the highest-confidence label that meets its
/// threshold. Exact confidence ties resolve to the earliest label in the
/// result's original ordering.
pub fn evaluate(result: &ModerationResult, policy: &Policy) -> PolicyDecision {
    let mut matched: Option<&ModerationLabel> = None;
    for label in &result.labels {
        let Some(threshold) = policy.threshold_for(label) else {
            continue;
        };
        if label.confidence < threshold {
            continue;
        }
        match matched {
            Some(best) if label.confidence <= best.confidence => {}
            _ => matched = Some(label),
        }
    }
    PolicyDecision {
        violates: matched.is_some(),
        matched_label: matched.cloned(),
    }
}
