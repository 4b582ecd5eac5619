mod client;
pub mod policy;

pub use client::{ClassifyError, ModerationClient};
pub use policy::{evaluate, Policy};

use crate::domain::ModerationResult;

/// External content classifier. Submits image bytes, yields ordered
/// label/confidence findings.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn detect_labels(&self, image: &[u8]) -> Result<ModerationResult, ClassifyError>;
}
