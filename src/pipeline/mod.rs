pub mod dedup;
pub mod fetcher;
pub mod orchestrator;
pub mod remediator;
pub mod retry;
pub mod verifier;

pub use dedup::DedupStore;
pub use orchestrator::{Orchestrator, WebhookReply};
