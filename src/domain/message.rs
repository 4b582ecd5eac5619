use crate::domain::event::{CallbackEvent, FileInfo};

/// A channel message carrying shared files, extracted from an accepted
/// `event_callback`. `ts` is the message's unique key within its channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub channel_id: String,
    pub ts: String,
    pub user_id: Option<String>,
    pub files: Vec<FileInfo>,
}

impl ChannelMessage {
    /// Returns `None` unless the event is a `file_share` message with a
    /// channel, a timestamp and at least one file.
    pub fn from_callback(event: &CallbackEvent) -> Option<Self> {
        if !event.is_file_share() || event.files.is_empty() {
            return None;
        }
        Some(Self {
            channel_id: event.channel.clone()?,
            ts: event.ts.clone()?,
            user_id: event.user.clone(),
            files: event.files.clone(),
        })
    }
}
