pub mod event;
pub mod message;
pub mod types;

pub use event::{CallbackEvent, FileInfo, InboundEvent};
pub use message::ChannelMessage;
pub use types::{ModerationLabel, ModerationResult, PolicyDecision, RemediationOutcome};
