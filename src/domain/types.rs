/// One detected content label. Labels form a two-level hierarchy: a label
/// with no `parent_name` is a top-level category.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationLabel {
    pub name: String,
    pub parent_name: Option<String>,
    pub confidence: f32,
}

impl ModerationLabel {
    /// Top-level category for this label (its parent, or itself).
    pub fn category(&self) -> &str {
        self.parent_name.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered classifier findings for one image. Produced once per fetch and
/// never mutated.
#[derive(Debug, Clone, Default)]
pub struct ModerationResult {
    pub labels: Vec<ModerationLabel>,
}

#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub violates: bool,
    pub matched_label: Option<ModerationLabel>,
}

/// What the remediation pair actually accomplished.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemediationOutcome {
    pub deleted: bool,
    /// The platform reported the message was already gone; treated as a
    /// successful deletion to keep remediation idempotent.
    pub already_gone: bool,
    pub notified: bool,
}

impl RemediationOutcome {
    pub fn is_partial(&self) -> bool {
        (!self.deleted && !self.already_gone) || !self.notified
    }
}
